use std::fmt::Write as _;

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::upnp::{ParseError, SoapAction, UpnpError};

pub const XML_CONTENT_TYPE: &str = "text/xml; charset=\"utf-8\"";

const ENVELOPE_OPEN: &str = concat!(
    r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>"#,
    r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" "#,
    r#"s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/"><s:Body>"#,
);
const ENVELOPE_CLOSE: &str = "</s:Body></s:Envelope>";

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("document root is not a SOAP Envelope")]
    NotEnvelope,
    #[error("SOAP Envelope has no Body")]
    MissingBody,
    #[error("SOAP Body must carry exactly one action element, found {0}")]
    ActionCount(usize),
    #[error("missing SOAPACTION header")]
    MissingHeader,
    #[error(transparent)]
    Action(#[from] ParseError),
}

/// A decoded control request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlRequest {
    pub action: SoapAction,
    /// Inner XML of the SOAP Body, action element included.
    pub args: String,
}

/// Decode a control request from its `SOAPACTION` header and body.
/// The header is mandatory; the body only supplies the arguments.
pub fn decode_request(soap_action: Option<&str>, body: &str) -> Result<ControlRequest, DecodeError> {
    let action = SoapAction::from_header(soap_action.ok_or(DecodeError::MissingHeader)?)?;
    let inner = body_inner(body)?;
    single_action(inner)?;
    Ok(ControlRequest {
        action,
        args: inner.to_string(),
    })
}

/// Slice of `doc` between `<Body>` and `</Body>` of the root `Envelope`.
fn body_inner(doc: &str) -> Result<&str, DecodeError> {
    let mut reader = Reader::from_str(doc);

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"Envelope" => break,
            Event::Start(_) | Event::Empty(_) | Event::Eof => return Err(DecodeError::NotEnvelope),
            _ => {}
        }
    }

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"Body" => {
                let span = reader.read_to_end(e.name())?;
                return Ok(&doc[span.start as usize..span.end as usize]);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"Body" => return Ok(""),
            // soap:Header and anything else ahead of the Body.
            Event::Start(e) => {
                reader.read_to_end(e.name())?;
            }
            Event::End(_) | Event::Eof => return Err(DecodeError::MissingBody),
            _ => {}
        }
    }
}

/// Fails unless `inner` holds exactly one top-level element.
fn single_action(inner: &str) -> Result<(), DecodeError> {
    let mut reader = Reader::from_str(inner);
    let mut count = 0;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                count += 1;
                reader.read_to_end(e.name())?;
            }
            Event::Empty(_) => count += 1,
            Event::Eof => break,
            _ => {}
        }
    }

    match count {
        1 => Ok(()),
        n => Err(DecodeError::ActionCount(n)),
    }
}

/// Wrap `inner` in the SOAP 1.1 envelope.
pub fn envelope(inner: &str) -> String {
    let mut out = String::with_capacity(ENVELOPE_OPEN.len() + inner.len() + ENVELOPE_CLOSE.len());
    out.push_str(ENVELOPE_OPEN);
    out.push_str(inner);
    out.push_str(ENVELOPE_CLOSE);
    out
}

/// `<u:{Action}Response>` carrying `args` in order, values escaped.
pub fn encode_response(action: &SoapAction, args: &[(String, String)]) -> String {
    let mut inner = format!(
        r#"<u:{name}Response xmlns:u="{urn}">"#,
        name = action.action,
        urn = escape(action.urn.to_string().as_str()),
    );
    for (name, value) in args {
        let _ = write!(inner, "<{name}>{}</{name}>", escape(value.as_str()));
    }
    let _ = write!(inner, "</u:{}Response>", action.action);
    envelope(&inner)
}

/// SOAP Fault carrying a UPnPError detail. Sent with HTTP 500.
pub fn encode_fault(err: &UpnpError) -> String {
    envelope(&format!(
        concat!(
            "<s:Fault><faultcode>s:Client</faultcode><faultstring>UPnPError</faultstring>",
            r#"<detail><UPnPError xmlns="urn:schemas-upnp-org:control-1-0">"#,
            "<errorCode>{code}</errorCode><errorDescription>{description}</errorDescription>",
            "</UPnPError></detail></s:Fault>",
        ),
        code = err.code,
        description = escape(err.description.as_str()),
    ))
}
