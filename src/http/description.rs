use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};

use crate::http::soap::XML_CONTENT_TYPE;
use crate::http::state::AppState;

const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

pub fn http_date(t: DateTime<Utc>) -> String {
    t.format(HTTP_DATE).to_string()
}

/// True when `If-Modified-Since` is at or after `last_modified`.
/// Unparseable dates are ignored.
fn not_modified(headers: &HeaderMap, last_modified: DateTime<Utc>) -> bool {
    headers
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| DateTime::parse_from_rfc2822(s.trim()).ok())
        .is_some_and(|since| since >= last_modified)
}

fn xml_document(headers: &HeaderMap, last_modified: DateTime<Utc>, body: String) -> Response {
    let stamp = http_date(last_modified);
    if not_modified(headers, last_modified) {
        return (StatusCode::NOT_MODIFIED, [(header::LAST_MODIFIED, stamp)]).into_response();
    }
    (
        [
            (header::CONTENT_TYPE, XML_CONTENT_TYPE.to_string()),
            (header::LAST_MODIFIED, stamp),
        ],
        body,
    )
        .into_response()
}

pub async fn serve_root_desc(State(state): State<AppState>, headers: HeaderMap) -> Response {
    xml_document(&headers, state.device.last_modified, state.device.root_xml().to_string())
}

pub async fn serve_scpd(
    State(state): State<AppState>,
    Path(file): Path<String>,
    headers: HeaderMap,
) -> Response {
    let url = format!("/scpd/{file}");
    match state.device.service_by_scpd_url(&url) {
        Some(service) => xml_document(&headers, state.device.last_modified, service.scpd.to_string()),
        None => {
            tracing::debug!("HTTP: unknown SCPD {}", url);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}
