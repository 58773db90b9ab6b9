//! Direct message endpoints
//!
//! - GET  /api/messages          - Caller's messages, newest first
//! - POST /api/messages          - Send a message
//! - PUT  /api/messages/:id/read - Receiver marks a message read

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
pub struct CreateMessageRequest {
    pub receiver_id: i32,
    pub content: String,
}

/// GET /api/messages
async fn handle_list(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let user = match authenticated_user(&req, &state).await {
        Ok(user) => user,
        Err(e) => return error_response(e),
    };

    match state.messages.list_for(user.id).await {
        Ok(messages) => json_response(StatusCode::OK, &messages),
        Err(e) => error_response(e),
    }
}

/// POST /api/messages
async fn handle_send(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let user = match authenticated_user(&req, &state).await {
        Ok(user) => user,
        Err(e) => return error_response(e),
    };
    let body: CreateMessageRequest = match parse_json_body(req).await {
        Ok(body) => body,
        Err(e) => return error_response(e),
    };

    match state
        .messages
        .send(user.id, body.receiver_id, body.content)
        .await
    {
        Ok(message) => json_response(StatusCode::CREATED, &message),
        Err(e) => error_response(e),
    }
}

/// PUT /api/messages/:id/read
async fn handle_mark_read(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    message_id: i32,
) -> Response<BoxBody> {
    let user = match authenticated_user(&req, &state).await {
        Ok(user) => user,
        Err(e) => return error_response(e),
    };

    match state.messages.mark_read(user.id, message_id).await {
        Ok(message) => json_response(StatusCode::OK, &message),
        Err(e) => error_response(e),
    }
}

/// Route dispatcher for the message endpoints
pub async fn handle_messages_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Option<Response<BoxBody>> {
    let path = req.uri().path();
    let path = path.split('?').next().unwrap_or(path);
    let rest = path.strip_prefix("/api/messages")?.to_string();
    let method = req.method().clone();

    let response = match (&method, rest.as_str()) {
        (&Method::GET, "") => handle_list(req, state).await,
        (&Method::POST, "") => handle_send(req, state).await,
        (_, "") => method_not_allowed(),

        (_, sub) => {
            let sub = sub.strip_prefix('/')?;
            let id_str = sub.strip_suffix("/read")?;
            let message_id = match parse_id(id_str) {
                Ok(id) => id,
                Err(e) => return Some(error_response(e)),
            };
            match method {
                Method::PUT => handle_mark_read(req, state, message_id).await,
                _ => method_not_allowed(),
            }
        }
    };

    Some(response)
}
