//! Trending health topic endpoint
//!
//! - GET /api/health-topics - Active topics, most discussed first (public)

use hyper::{Method, Request, Response, StatusCode};
use std::sync::Arc;

use crate::server::AppState;

use super::{error_response, json_response, method_not_allowed, BoxBody};

/// Route dispatcher for the topic endpoints
pub async fn handle_topics_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Option<Response<BoxBody>> {
    let path = req.uri().path();
    let path = path.split('?').next().unwrap_or(path);

    if path != "/api/health-topics" {
        return None;
    }

    let response = match *req.method() {
        Method::GET => match state.store.health_topics().await {
            Ok(topics) => json_response(StatusCode::OK, &topics),
            Err(e) => error_response(e),
        },
        _ => method_not_allowed(),
    };

    Some(response)
}
