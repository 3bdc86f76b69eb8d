use std::fmt;

pub const INVALID_ACTION: u32 = 401;
pub const INVALID_ARGS: u32 = 402;
pub const ACTION_FAILED: u32 = 501;
pub const ARGUMENT_VALUE_INVALID: u32 = 600;
/// ContentDirectory: the requested ObjectID does not exist.
pub const NO_SUCH_OBJECT: u32 = 701;

/// The only error shape that crosses the SOAP boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpnpError {
    pub code: u32,
    pub description: String,
}

impl UpnpError {
    pub fn new(code: u32, description: impl Into<String>) -> Self {
        UpnpError {
            code,
            description: description.into(),
        }
    }

    pub fn invalid_action() -> Self {
        UpnpError::new(INVALID_ACTION, "Invalid Action")
    }

    pub fn invalid_args() -> Self {
        UpnpError::new(INVALID_ARGS, "Invalid Args")
    }
}

impl fmt::Display for UpnpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.description)
    }
}

impl std::error::Error for UpnpError {}

/// Error returned by a service handler.
///
/// `Upnp` keeps its code on the wire; anything else is reported as
/// 501 Action Failed carrying the error's message.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Upnp(#[from] UpnpError),
    #[error(transparent)]
    Failed(Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    pub fn failed(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        HandlerError::Failed(err.into())
    }
}

impl From<HandlerError> for UpnpError {
    fn from(err: HandlerError) -> Self {
        match err {
            HandlerError::Upnp(e) => e,
            HandlerError::Failed(e) => UpnpError::new(ACTION_FAILED, e.to_string()),
        }
    }
}
