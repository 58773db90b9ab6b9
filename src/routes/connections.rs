//! Connection endpoints
//!
//! - GET  /api/connections     - Caller's connections, both directions
//! - POST /api/connections     - File a request to another user
//! - PUT  /api/connections/:id - Accept or reject a pending request

use hyper::{Method, Request, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;

use crate::server::AppState;

use super::{
    authenticated_user, error_response, json_response, method_not_allowed, parse_id,
    parse_json_body, BoxBody,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConnectionRequest {
    pub following_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateConnectionRequest {
    pub status: String,
}

/// GET /api/connections
async fn handle_list(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let user = match authenticated_user(&req, &state).await {
        Ok(user) => user,
        Err(e) => return error_response(e),
    };

    match state.connections.list_for(user.id).await {
        Ok(connections) => json_response(StatusCode::OK, &connections),
        Err(e) => error_response(e),
    }
}

/// POST /api/connections
async fn handle_request_connection(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let user = match authenticated_user(&req, &state).await {
        Ok(user) => user,
        Err(e) => return error_response(e),
    };
    let body: CreateConnectionRequest = match parse_json_body(req).await {
        Ok(body) => body,
        Err(e) => return error_response(e),
    };

    match state.connections.request(user.id, body.following_id).await {
        Ok(connection) => json_response(StatusCode::CREATED, &connection),
        Err(e) => error_response(e),
    }
}

/// PUT /api/connections/:id
async fn handle_respond(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    connection_id: i32,
) -> Response<BoxBody> {
    let user = match authenticated_user(&req, &state).await {
        Ok(user) => user,
        Err(e) => return error_response(e),
    };
    let body: UpdateConnectionRequest = match parse_json_body(req).await {
        Ok(body) => body,
        Err(e) => return error_response(e),
    };

    match state
        .connections
        .respond(user.id, connection_id, &body.status)
        .await
    {
        Ok(connection) => json_response(StatusCode::OK, &connection),
        Err(e) => error_response(e),
    }
}

/// Route dispatcher for the connection endpoints
pub async fn handle_connections_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Option<Response<BoxBody>> {
    let path = req.uri().path();
    let path = path.split('?').next().unwrap_or(path);
    let rest = path.strip_prefix("/api/connections")?.to_string();
    let method = req.method().clone();

    let response = match (&method, rest.as_str()) {
        (&Method::GET, "") => handle_list(req, state).await,
        (&Method::POST, "") => handle_request_connection(req, state).await,
        (_, "") => method_not_allowed(),

        (_, sub) => {
            let id_str = sub.strip_prefix('/')?;
            let connection_id = match parse_id(id_str) {
                Ok(id) => id,
                Err(e) => return Some(error_response(e)),
            };
            match method {
                Method::PUT => handle_respond(req, state, connection_id).await,
                _ => method_not_allowed(),
            }
        }
    };

    Some(response)
}
