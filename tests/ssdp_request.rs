use dlnad::ssdp::request::{parse, RequestError};

const MSEARCH: &str = "M-SEARCH * HTTP/1.1\r\n\
HOST: 239.255.255.250:1900\r\n\
MAN: \"ssdp:discover\"\r\n\
MX: 2\r\n\
ST: ssdp:all\r\n\
\r\n";

#[test]
fn parses_msearch() {
    let req = parse(MSEARCH.as_bytes()).unwrap();
    assert_eq!(req.method, "M-SEARCH");
    assert_eq!(req.header("ST"), Some("ssdp:all"));
    assert_eq!(req.header("man"), Some("\"ssdp:discover\""));
    assert_eq!(req.header("Mx"), Some("2"));
    assert_eq!(req.header("USER-AGENT"), None);
}

#[test]
fn accepts_bare_newlines_and_padded_values() {
    let req = parse(b"M-SEARCH * HTTP/1.1\nST:   upnp:rootdevice  \n\n").unwrap();
    assert_eq!(req.header("st"), Some("upnp:rootdevice"));
}

#[test]
fn folded_header_lines_continue_previous_value() {
    let req = parse(b"M-SEARCH * HTTP/1.1\r\nST: urn:a\r\n  continued\r\n\tand more\r\nMX: 1\r\n\r\n").unwrap();
    assert_eq!(req.header("ST"), Some("urn:a continued and more"));
    assert_eq!(req.header("MX"), Some("1"));
}

#[test]
fn folded_line_without_previous_header_is_rejected() {
    assert!(matches!(
        parse(b"M-SEARCH * HTTP/1.1\r\n  orphan\r\n\r\n"),
        Err(RequestError::Header(_))
    ));
}

#[test]
fn rejects_bad_request_line() {
    assert!(matches!(parse(b"M-SEARCH\r\n\r\n"), Err(RequestError::RequestLine(_))));
    assert!(matches!(parse(b""), Err(RequestError::RequestLine(_))));
}

#[test]
fn rejects_non_star_target() {
    assert!(matches!(
        parse(b"M-SEARCH /index.html HTTP/1.1\r\n\r\n"),
        Err(RequestError::Target(_))
    ));
}

#[test]
fn rejects_bad_version() {
    assert!(matches!(parse(b"M-SEARCH * HTTP/x\r\n\r\n"), Err(RequestError::Version(_))));
    assert!(matches!(parse(b"M-SEARCH * SIP/2.0\r\n\r\n"), Err(RequestError::Version(_))));
}

#[test]
fn rejects_header_without_colon() {
    assert!(matches!(
        parse(b"M-SEARCH * HTTP/1.1\r\nST ssdp:all\r\n\r\n"),
        Err(RequestError::Header(_))
    ));
}

#[test]
fn rejects_invalid_utf8() {
    assert_eq!(parse(&[0xff, 0xfe, 0x00]), Err(RequestError::Encoding));
}
