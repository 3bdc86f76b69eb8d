use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid service type {0:?}")]
    ServiceType(String),
    #[error("invalid SOAP action {0:?}")]
    Action(String),
}

/// A service type such as `urn:schemas-upnp-org:service:ContentDirectory:1`.
///
/// The authority is kept verbatim (real ones contain `-` and `.`); the type
/// must be word characters and the version a non-negative integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceUrn {
    pub authority: String,
    pub service_type: String,
    pub version: u64,
}

impl ServiceUrn {
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let invalid = || ParseError::ServiceType(s.to_string());

        let (head, version) = s.rsplit_once(':').ok_or_else(invalid)?;
        let (head, service_type) = head.rsplit_once(':').ok_or_else(invalid)?;
        let authority = head
            .strip_prefix("urn:")
            .and_then(|rest| rest.strip_suffix(":service"))
            .ok_or_else(invalid)?;

        if authority.is_empty() || !is_word(service_type) {
            return Err(invalid());
        }
        if version.is_empty() || !version.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let version = version.parse::<u64>().map_err(|_| invalid())?;

        Ok(ServiceUrn {
            authority: authority.to_string(),
            service_type: service_type.to_string(),
            version,
        })
    }
}

fn is_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl FromStr for ServiceUrn {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceUrn::parse(s)
    }
}

impl fmt::Display for ServiceUrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "urn:{}:service:{}:{}",
            self.authority, self.service_type, self.version
        )
    }
}

/// A service URN plus the action invoked on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapAction {
    pub urn: ServiceUrn,
    pub action: String,
}

impl SoapAction {
    /// Parse the `SOAPACTION` header form: `"<serviceURN>#<action>"`, quotes included.
    pub fn from_header(raw: &str) -> Result<Self, ParseError> {
        let invalid = || ParseError::Action(raw.to_string());

        let s = raw.trim();
        if s.len() < 3 {
            return Err(invalid());
        }
        let inner = s
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .ok_or_else(invalid)?;
        let (urn, action) = inner.rsplit_once('#').ok_or_else(invalid)?;
        if action.is_empty() {
            return Err(invalid());
        }

        Ok(SoapAction {
            urn: ServiceUrn::parse(urn)?,
            action: action.to_string(),
        })
    }
}

impl fmt::Display for SoapAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.urn, self.action)
    }
}
