pub mod control;
pub mod description;
pub mod soap;
pub mod state;

use axum::{
    http::{header, HeaderName, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::http::state::AppState;
use crate::upnp::description::{CONTROL_PATH, ROOT_DESC_PATH};

pub fn build_router(state: AppState) -> Router {
    let server = HeaderValue::from_str(&state.device.server).ok();
    Router::new()
        .route(ROOT_DESC_PATH, get(description::serve_root_desc))
        .route("/scpd/{file}", get(description::serve_scpd))
        .route(CONTROL_PATH, post(control::control))
        .layer(SetResponseHeaderLayer::overriding(header::SERVER, server))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("ext"),
            HeaderValue::from_static(""),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
