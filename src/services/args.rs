use quick_xml::escape::unescape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::upnp::UpnpError;

/// Input arguments of one SOAP action, read from the action element's children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    values: Vec<(String, String)>,
}

impl Arguments {
    /// Read the child elements of the first element in `args_xml`.
    ///
    /// Values are unescaped; an empty element yields an empty string.
    /// Malformed XML is reported as 402.
    pub fn parse(args_xml: &str) -> Result<Self, UpnpError> {
        let malformed = |e: &dyn std::fmt::Display| {
            tracing::debug!("SOAP: unreadable action arguments: {}", e);
            UpnpError::invalid_args()
        };

        let mut reader = Reader::from_str(args_xml);
        let mut values = Vec::new();
        let mut in_action = false;
        loop {
            match reader.read_event() {
                Ok(Event::Start(_)) if !in_action => in_action = true,
                Ok(Event::Start(e)) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    let span = reader.read_to_end(e.name()).map_err(|e| malformed(&e))?;
                    let raw = &args_xml[span.start as usize..span.end as usize];
                    let value = unescape(raw).map_err(|e| malformed(&e))?;
                    values.push((name, value.into_owned()));
                }
                Ok(Event::Empty(e)) if in_action => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    values.push((name, String::new()));
                }
                // An empty action element carries no arguments.
                Ok(Event::Empty(_)) | Ok(Event::End(_)) | Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(malformed(&e)),
            }
        }
        Ok(Arguments { values })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Value of `name`, or 402 when it is absent.
    pub fn require(&self, name: &str) -> Result<&str, UpnpError> {
        self.get(name).ok_or_else(|| {
            UpnpError::new(crate::upnp::error::INVALID_ARGS, format!("missing argument {name}"))
        })
    }
}
