//! Parser for the HTTP-shaped requests carried in SSDP datagrams.
//!
//! Separate from the HTTP server: SSDP requests have no body, target `*` and
//! arrive one per datagram.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("datagram is not valid UTF-8")]
    Encoding,
    #[error("malformed request line {0:?}")]
    RequestLine(String),
    #[error("bad request target {0:?}")]
    Target(String),
    #[error("malformed HTTP version {0:?}")]
    Version(String),
    #[error("malformed header line {0:?}")]
    Header(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsdpRequest {
    pub method: String,
    headers: Vec<(String, String)>,
}

impl SsdpRequest {
    /// First value of `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

pub fn parse(datagram: &[u8]) -> Result<SsdpRequest, RequestError> {
    let text = std::str::from_utf8(datagram).map_err(|_| RequestError::Encoding)?;
    let mut lines = text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));

    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.splitn(3, ' ');
    let (Some(method), Some(target), Some(version)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(RequestError::RequestLine(request_line.to_string()));
    };
    if method.is_empty() {
        return Err(RequestError::RequestLine(request_line.to_string()));
    }
    if target != "*" {
        return Err(RequestError::Target(target.to_string()));
    }
    if !is_http_version(version.trim()) {
        return Err(RequestError::Version(version.to_string()));
    }

    let mut headers: Vec<(String, String)> = Vec::new();
    for line in lines {
        if line.is_empty() {
            break;
        }
        // Folded continuation of the previous header.
        if line.starts_with([' ', '\t']) {
            let Some((_, value)) = headers.last_mut() else {
                return Err(RequestError::Header(line.to_string()));
            };
            let more = line.trim();
            if !more.is_empty() {
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(more);
            }
            continue;
        }
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| RequestError::Header(line.to_string()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(RequestError::Header(line.to_string()));
        }
        headers.push((key.to_string(), value.trim().to_string()));
    }

    Ok(SsdpRequest {
        method: method.to_string(),
        headers,
    })
}

fn is_http_version(s: &str) -> bool {
    let Some((major, minor)) = s.strip_prefix("HTTP/").and_then(|v| v.split_once('.')) else {
        return false;
    };
    major.parse::<u8>().is_ok() && minor.parse::<u8>().is_ok()
}
