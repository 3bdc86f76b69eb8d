use dlnad::http::soap::{decode_request, encode_fault, encode_response, envelope, DecodeError};
use dlnad::upnp::{SoapAction, UpnpError};

const CDS: &str = "urn:schemas-upnp-org:service:ContentDirectory:1";
const BROWSE: Option<&str> = Some("\"urn:schemas-upnp-org:service:ContentDirectory:1#Browse\"");

fn browse_body() -> &'static str {
    r#"<?xml version="1.0" encoding="utf-8"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
  <s:Body>
    <u:Browse xmlns:u="urn:schemas-upnp-org:service:ContentDirectory:1">
      <ObjectID>0</ObjectID>
      <BrowseFlag>BrowseDirectChildren</BrowseFlag>
      <Filter>*</Filter>
      <StartingIndex>5</StartingIndex>
      <RequestedCount>0</RequestedCount>
      <SortCriteria></SortCriteria>
    </u:Browse>
  </s:Body>
</s:Envelope>"#
}

fn action(urn: &str, name: &str) -> SoapAction {
    SoapAction::from_header(&format!("\"{urn}#{name}\"")).unwrap()
}

// ── decode_request ────────────────────────────────────────────────────────────

#[test]
fn decode_uses_header_action() {
    let req = decode_request(Some(&format!("\"{CDS}#Browse\"")), browse_body()).unwrap();
    assert_eq!(req.action.action, "Browse");
    assert_eq!(req.action.urn.to_string(), CDS);
    assert!(req.args.trim_start().starts_with("<u:Browse"));
    assert!(req.args.trim_end().ends_with("</u:Browse>"));
    assert!(req.args.contains("<ObjectID>0</ObjectID>"));
}

#[test]
fn decode_requires_header() {
    assert!(matches!(decode_request(None, browse_body()), Err(DecodeError::MissingHeader)));
    assert!(matches!(decode_request(Some(""), browse_body()), Err(DecodeError::Action(_))));
}

#[test]
fn decode_skips_soap_header() {
    let body = concat!(
        r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">"#,
        "<s:Header><Token>abc</Token></s:Header>",
        r#"<s:Body><u:GetSystemUpdateID xmlns:u="urn:schemas-upnp-org:service:ContentDirectory:1"/></s:Body>"#,
        "</s:Envelope>",
    );
    let req = decode_request(Some(&format!("\"{CDS}#GetSystemUpdateID\"")), body).unwrap();
    assert_eq!(req.action.action, "GetSystemUpdateID");
    assert!(req.args.starts_with("<u:GetSystemUpdateID"));
}

#[test]
fn decode_rejects_malformed_xml() {
    let truncated = &browse_body()[..browse_body().len() - 30];
    assert!(decode_request(BROWSE, truncated).is_err());
    assert!(matches!(
        decode_request(BROWSE, "<s:Envelope><s:Body><a></b></s:Body></s:Envelope>"),
        Err(DecodeError::Xml(_))
    ));
}

#[test]
fn decode_rejects_non_envelope_root() {
    assert!(matches!(
        decode_request(BROWSE, "<html><body/></html>"),
        Err(DecodeError::NotEnvelope)
    ));
    assert!(matches!(decode_request(BROWSE, ""), Err(DecodeError::NotEnvelope)));
}

#[test]
fn decode_rejects_missing_body() {
    assert!(matches!(
        decode_request(BROWSE, "<s:Envelope></s:Envelope>"),
        Err(DecodeError::MissingBody)
    ));
}

#[test]
fn decode_requires_exactly_one_action() {
    assert!(matches!(
        decode_request(BROWSE, "<s:Envelope><s:Body></s:Body></s:Envelope>"),
        Err(DecodeError::ActionCount(0))
    ));
    assert!(matches!(
        decode_request(BROWSE, "<s:Envelope><s:Body><a/><b></b></s:Body></s:Envelope>"),
        Err(DecodeError::ActionCount(2))
    ));
}

#[test]
fn decode_rejects_bad_header() {
    assert!(matches!(
        decode_request(Some("Browse"), browse_body()),
        Err(DecodeError::Action(_))
    ));
}

// ── encoding ──────────────────────────────────────────────────────────────────

#[test]
fn encode_response_matches_wire_form() {
    let out = encode_response(
        &action("urn:schemas-upnp-org:service:X:1", "GetSystemUpdateID"),
        &[("Id".to_string(), "1".to_string())],
    );
    assert!(out.starts_with(r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>"#));
    assert!(out.contains(
        r#"<u:GetSystemUpdateIDResponse xmlns:u="urn:schemas-upnp-org:service:X:1"><Id>1</Id></u:GetSystemUpdateIDResponse>"#
    ));
    assert!(out.ends_with("</s:Body></s:Envelope>"));
}

#[test]
fn encode_response_escapes_and_keeps_order() {
    let out = encode_response(
        &action(CDS, "Browse"),
        &[
            ("Result".to_string(), "<DIDL-Lite/>".to_string()),
            ("NumberReturned".to_string(), "0".to_string()),
        ],
    );
    assert!(out.contains("<Result>&lt;DIDL-Lite/&gt;</Result><NumberReturned>0</NumberReturned>"));
}

#[test]
fn encode_fault_carries_upnp_error() {
    let out = encode_fault(&UpnpError::new(701, "No such object & more"));
    assert!(out.contains("<faultcode>s:Client</faultcode>"));
    assert!(out.contains("<faultstring>UPnPError</faultstring>"));
    assert!(out.contains(r#"<UPnPError xmlns="urn:schemas-upnp-org:control-1-0">"#));
    assert!(out.contains("<errorCode>701</errorCode>"));
    assert!(out.contains("<errorDescription>No such object &amp; more</errorDescription>"));
}

#[test]
fn envelope_wraps_body() {
    let out = envelope("<x/>");
    assert!(out.contains("<s:Body><x/></s:Body>"));
    assert!(out.contains(r#"s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/""#));
}
