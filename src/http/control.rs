use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::soap;
use crate::http::state::AppState;

fn xml(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, soap::XML_CONTENT_TYPE)], body).into_response()
}

fn bad_request(reason: String) -> Response {
    tracing::debug!("SOAP: rejecting control request: {}", reason);
    (StatusCode::BAD_REQUEST, reason).into_response()
}

/// `POST /ctl`: decode the envelope, route on the service type, encode the
/// result or a UPnP fault. Malformed requests never reach a handler.
pub async fn control(State(state): State<AppState>, headers: HeaderMap, body: String) -> Response {
    // axum HeaderMap is case-insensitive, so "soapaction" matches "SOAPAction".
    let soap_action = match headers.get("soapaction").map(|v| v.to_str()) {
        Some(Ok(raw)) => Some(raw),
        Some(Err(_)) => return bad_request("SOAPACTION header is not valid text".to_string()),
        None => None,
    };
    let request = match soap::decode_request(soap_action, &body) {
        Ok(request) => request,
        Err(e) => return bad_request(e.to_string()),
    };

    match state.router.dispatch(&request.action, &request.args).await {
        Ok(out) => xml(StatusCode::OK, soap::encode_response(&request.action, &out)),
        Err(err) => {
            tracing::debug!("SOAP: {} -> fault {}", request.action, err);
            xml(StatusCode::INTERNAL_SERVER_ERROR, soap::encode_fault(&err))
        }
    }
}
