use std::sync::Arc;

use dlnad::services::args::Arguments;
use dlnad::services::connection_manager::{source_protocol_info, ConnectionManager};
use dlnad::services::content_directory::ContentDirectory;
use dlnad::services::media_receiver_registrar::MediaReceiverRegistrar;
use dlnad::services::{media_server_router, ActionOutput, ServiceHandler, ServiceRouter};
use dlnad::upnp::error::{
    ACTION_FAILED, ARGUMENT_VALUE_INVALID, INVALID_ACTION, INVALID_ARGS, NO_SUCH_OBJECT,
};
use dlnad::upnp::{DeviceDescription, HandlerError, SoapAction, UpnpError};

fn device() -> Arc<DeviceDescription> {
    Arc::new(DeviceDescription::media_server("Handler Test"))
}

fn value<'a>(out: &'a ActionOutput, name: &str) -> &'a str {
    out.iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
        .unwrap_or_else(|| panic!("missing output {name} in {out:?}"))
}

fn browse_args(object_id: &str, flag: &str) -> String {
    format!(
        r#"<u:Browse xmlns:u="urn:schemas-upnp-org:service:ContentDirectory:1"><ObjectID>{object_id}</ObjectID><BrowseFlag>{flag}</BrowseFlag><Filter>*</Filter><StartingIndex>0</StartingIndex><RequestedCount>0</RequestedCount><SortCriteria/></u:Browse>"#
    )
}

fn upnp_code(result: Result<ActionOutput, HandlerError>) -> u32 {
    UpnpError::from(result.unwrap_err()).code
}

// ── Arguments ─────────────────────────────────────────────────────────────────

#[test]
fn arguments_read_children_of_action() {
    let args = Arguments::parse(&browse_args("0", "BrowseMetadata")).unwrap();
    assert_eq!(args.get("ObjectID"), Some("0"));
    assert_eq!(args.get("BrowseFlag"), Some("BrowseMetadata"));
    assert_eq!(args.get("SortCriteria"), Some(""));
    assert_eq!(args.get("RequestedCount"), Some("0"));
    assert_eq!(args.get("Missing"), None);
}

#[test]
fn arguments_are_unescaped() {
    let args = Arguments::parse("<u:Search><SearchCriteria>dc:title = &quot;A &amp; B&quot;</SearchCriteria></u:Search>").unwrap();
    assert_eq!(args.get("SearchCriteria"), Some("dc:title = \"A & B\""));
}

#[test]
fn empty_action_has_no_arguments() {
    let args = Arguments::parse(r#"<u:GetSystemUpdateID xmlns:u="x"/>"#).unwrap();
    assert_eq!(args.get("GetSystemUpdateID"), None);
    assert_eq!(args.require("ObjectID").unwrap_err().code, INVALID_ARGS);
}

#[test]
fn require_reports_invalid_args() {
    let args = Arguments::parse("<u:A></u:A>").unwrap();
    assert_eq!(args.require("ObjectID").unwrap_err().code, INVALID_ARGS);
}

// ── ContentDirectory ──────────────────────────────────────────────────────────

#[tokio::test]
async fn cds_simple_actions() {
    let cds = ContentDirectory::new(device());
    let out = cds.handle("GetSystemUpdateID", "").await.unwrap();
    assert_eq!(value(&out, "Id"), std::process::id().to_string());
    let out = cds.handle("GetSortCapabilities", "").await.unwrap();
    assert_eq!(value(&out, "SortCaps"), "dc:title");
    let out = cds.handle("GetSearchCapabilities", "").await.unwrap();
    assert_eq!(value(&out, "SearchCaps"), "");
}

#[tokio::test]
async fn cds_browse_root_children_is_empty() {
    let cds = ContentDirectory::new(device());
    let out = cds
        .handle("Browse", &browse_args("0", "BrowseDirectChildren"))
        .await
        .unwrap();
    let names: Vec<&str> = out.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(names, ["Result", "NumberReturned", "TotalMatches", "UpdateID"]);
    assert!(value(&out, "Result").starts_with("<DIDL-Lite"));
    assert!(!value(&out, "Result").contains("<container"));
    assert_eq!(value(&out, "NumberReturned"), "0");
    assert_eq!(value(&out, "TotalMatches"), "0");
}

#[tokio::test]
async fn cds_browse_root_metadata() {
    let cds = ContentDirectory::new(device());
    let out = cds.handle("Browse", &browse_args("0", "BrowseMetadata")).await.unwrap();
    let didl = value(&out, "Result");
    assert!(didl.contains(r#"<container id="0" parentID="-1""#));
    assert!(didl.contains("<dc:title>Handler Test</dc:title>"));
    assert_eq!(value(&out, "NumberReturned"), "1");
}

#[tokio::test]
async fn cds_browse_errors() {
    let cds = ContentDirectory::new(device());
    assert_eq!(
        upnp_code(cds.handle("Browse", &browse_args("42", "BrowseMetadata")).await),
        NO_SUCH_OBJECT
    );
    assert_eq!(
        upnp_code(cds.handle("Browse", &browse_args("0", "BrowseEverything")).await),
        ARGUMENT_VALUE_INVALID
    );
    assert_eq!(
        upnp_code(cds.handle("Browse", "<u:Browse><ObjectID>0</ObjectID></u:Browse>").await),
        INVALID_ARGS
    );
    assert_eq!(upnp_code(cds.handle("Search", "").await), INVALID_ACTION);
}

// ── ConnectionManager / MediaReceiverRegistrar ───────────────────────────────

#[tokio::test]
async fn cms_protocol_info() {
    let out = ConnectionManager.handle("GetProtocolInfo", "").await.unwrap();
    assert_eq!(value(&out, "Source"), source_protocol_info());
    assert!(value(&out, "Source").contains("http-get:*:audio/flac:*"));
    assert_eq!(value(&out, "Sink"), "");
}

#[tokio::test]
async fn cms_connection_info() {
    let out = ConnectionManager
        .handle(
            "GetCurrentConnectionInfo",
            "<u:GetCurrentConnectionInfo><ConnectionID>0</ConnectionID></u:GetCurrentConnectionInfo>",
        )
        .await
        .unwrap();
    assert_eq!(value(&out, "Direction"), "Output");
    assert_eq!(value(&out, "Status"), "OK");
    assert_eq!(
        upnp_code(ConnectionManager.handle("GetCurrentConnectionInfo", "<u:X/>").await),
        INVALID_ARGS
    );
}

#[tokio::test]
async fn registrar_authorizes_everyone() {
    let dev = device();
    let mrr = MediaReceiverRegistrar::new(Arc::clone(&dev));
    for action in ["IsAuthorized", "IsValidated"] {
        let out = mrr.handle(action, "").await.unwrap();
        assert_eq!(value(&out, "Result"), "1");
    }
    let out = mrr.handle("RegisterDevice", "").await.unwrap();
    assert_eq!(value(&out, "RegistrationRespMsg"), dev.uuid);
    assert_eq!(upnp_code(mrr.handle("Unregister", "").await), INVALID_ACTION);
}

// ── ServiceRouter ─────────────────────────────────────────────────────────────

struct Failing;

#[async_trait::async_trait]
impl ServiceHandler for Failing {
    async fn handle(&self, _action: &str, _args_xml: &str) -> Result<ActionOutput, HandlerError> {
        Err(HandlerError::failed("backend unavailable"))
    }
}

fn soap(urn: &str, name: &str) -> SoapAction {
    SoapAction::from_header(&format!("\"{urn}#{name}\"")).unwrap()
}

#[tokio::test]
async fn router_dispatches_on_service_type() {
    let router = media_server_router(device()).unwrap();
    let ids = router
        .dispatch(&soap("urn:schemas-upnp-org:service:ConnectionManager:1", "GetCurrentConnectionIDs"), "")
        .await
        .unwrap();
    assert_eq!(value(&ids, "ConnectionIDs"), "0");
    let authorized = router
        .dispatch(&soap("urn:microsoft.com:service:X_MS_MediaReceiverRegistrar:1", "IsAuthorized"), "")
        .await
        .unwrap();
    assert_eq!(value(&authorized, "Result"), "1");

    // Version and authority are not part of the routing key.
    let out = router
        .dispatch(&soap("urn:schemas-upnp-org:service:ContentDirectory:2", "GetSortCapabilities"), "")
        .await
        .unwrap();
    assert_eq!(value(&out, "SortCaps"), "dc:title");
}

#[tokio::test]
async fn router_rejects_unknown_service() {
    let router = media_server_router(device()).unwrap();
    let err = router
        .dispatch(&soap("urn:schemas-upnp-org:service:AVTransport:1", "Play"), "")
        .await
        .unwrap_err();
    assert_eq!(err, UpnpError::new(INVALID_ACTION, "Invalid service: AVTransport"));
}

#[tokio::test]
async fn router_passes_handler_upnp_errors_through() {
    let router = media_server_router(device()).unwrap();
    let err = router
        .dispatch(
            &soap("urn:schemas-upnp-org:service:ContentDirectory:1", "Browse"),
            &browse_args("42", "BrowseMetadata"),
        )
        .await
        .unwrap_err();
    assert_eq!(err, UpnpError::new(NO_SUCH_OBJECT, "No such object"));
}

#[tokio::test]
async fn router_wraps_handler_failures() {
    let router = ServiceRouter::from_handlers([(
        "urn:example-com:service:Flaky:1",
        Arc::new(Failing) as Arc<dyn ServiceHandler>,
    )])
    .unwrap();
    let err = router
        .dispatch(&soap("urn:example-com:service:Flaky:1", "Anything"), "")
        .await
        .unwrap_err();
    assert_eq!(err, UpnpError::new(ACTION_FAILED, "backend unavailable"));
}

#[test]
fn router_rejects_bad_urn() {
    assert!(ServiceRouter::new()
        .with_handler("not-a-urn", Arc::new(Failing))
        .is_err());
}
