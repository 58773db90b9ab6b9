//! HTTP routes for the MediConnect API

pub mod appointments;
pub mod auth_routes;
pub mod connections;
pub mod directory;
pub mod health;
pub mod messages;
pub mod posts;
pub mod topics;

pub use appointments::handle_appointments_request;
pub use auth_routes::handle_auth_request;
pub use connections::handle_connections_request;
pub use directory::handle_directory_request;
pub use health::{health_check, version_info};
pub use messages::handle_messages_request;
pub use posts::handle_posts_request;
pub use topics::handle_topics_request;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::model::User;
use crate::server::AppState;
use crate::types::ApiError;

pub(crate) type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Name of the session cookie the API sets on login
pub const SESSION_COOKIE: &str = "mediconnect_session";

/// Largest request body the API accepts
const MAX_BODY_SIZE: usize = 64 * 1024;

/// Wire shape of every error the API returns
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// Wire shape of plain acknowledgements (logout and the like)
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

// =============================================================================
// Response Helpers
// =============================================================================

pub(crate) fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<BoxBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(full_body(json))
        .unwrap()
}

/// Map an error onto the envelope the client sees
///
/// Server-side failures get logged here with their full detail; the wire
/// only ever carries the generic message.
pub(crate) fn error_response(err: ApiError) -> Response<BoxBody> {
    if err.status_code().is_server_error() {
        error!("Request failed: {}", err);
    }
    let (status, message) = err.into_status_code_and_body();
    json_response(status, &ErrorResponse { message })
}

pub(crate) fn method_not_allowed() -> Response<BoxBody> {
    json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &ErrorResponse {
            message: "Method not allowed".to_string(),
        },
    )
}

pub(crate) fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

// =============================================================================
// Request Helpers
// =============================================================================

pub(crate) async fn parse_json_body<T: for<'de> Deserialize<'de>>(
    req: Request<hyper::body::Incoming>,
) -> Result<T, ApiError> {
    let body = req
        .collect()
        .await
        .map_err(|e| ApiError::Http(format!("Failed to read body: {}", e)))?;

    let bytes = body.to_bytes();
    if bytes.len() > MAX_BODY_SIZE {
        return Err(ApiError::Http("Request body too large".to_string()));
    }

    serde_json::from_slice(&bytes).map_err(|e| ApiError::BadRequest(format!("Invalid JSON: {}", e)))
}

/// Parse a numeric id path segment
pub(crate) fn parse_id(segment: &str) -> Result<i32, ApiError> {
    segment
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid id: {}", segment)))
}

/// Pull the session id out of a Cookie header value
pub(crate) fn session_id_from_cookie_header(header: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

fn session_id_from_request(req: &Request<hyper::body::Incoming>) -> Option<String> {
    let header = req.headers().get(hyper::header::COOKIE)?.to_str().ok()?;
    session_id_from_cookie_header(header)
}

/// Resolve the calling user from the session cookie
///
/// A valid lookup slides the session TTL forward.
pub(crate) async fn authenticated_user(
    req: &Request<hyper::body::Incoming>,
    state: &AppState,
) -> Result<User, ApiError> {
    let session_id = session_id_from_request(req)
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;
    let session = state
        .sessions
        .validate(&session_id)
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;
    state
        .store
        .user_by_id(session.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))
}

/// Cookie header value that installs a session on the client
pub(crate) fn session_cookie(session_id: &str, ttl_secs: u64) -> String {
    format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_secs}")
}

/// Cookie header value that removes the session from the client
pub(crate) fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Attach a Set-Cookie header to a JSON response
pub(crate) fn with_cookie(mut response: Response<BoxBody>, cookie: String) -> Response<BoxBody> {
    if let Ok(value) = hyper::header::HeaderValue::from_str(&cookie) {
        response
            .headers_mut()
            .insert(hyper::header::SET_COOKIE, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_from_cookie_header() {
        assert_eq!(
            session_id_from_cookie_header("mediconnect_session=sess_abc"),
            Some("sess_abc".to_string())
        );
        assert_eq!(
            session_id_from_cookie_header("theme=dark; mediconnect_session=sess_abc; lang=en"),
            Some("sess_abc".to_string())
        );
        assert_eq!(session_id_from_cookie_header("theme=dark"), None);
        assert_eq!(session_id_from_cookie_header(""), None);
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(parse_id("forty-two").is_err());
        assert!(parse_id("").is_err());
    }

    #[test]
    fn test_cookie_values() {
        let set = session_cookie("sess_abc", 3600);
        assert!(set.starts_with("mediconnect_session=sess_abc;"));
        assert!(set.contains("HttpOnly"));
        assert!(set.contains("Max-Age=3600"));

        let clear = clear_session_cookie();
        assert!(clear.contains("Max-Age=0"));
    }
}
