//! Community feed endpoints
//!
//! - GET  /api/posts               - Whole feed, newest first (public)
//! - POST /api/posts               - Publish a post
//! - POST /api/posts/:id/like      - Toggle the caller's like
//! - GET  /api/posts/:id/comments  - A post's comments, oldest first (public)
//! - POST /api/posts/:id/comments  - Comment on a post

use hyper::{Method, Request, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;

use crate::model::{NewPost, PostType};
use crate::server::AppState;
use crate::types::ApiError;

use super::{
    authenticated_user, error_response, json_response, method_not_allowed, parse_id,
    parse_json_body, BoxBody,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub post_type: Option<String>,
    #[serde(default)]
    pub related_conditions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

/// GET /api/posts
async fn handle_feed(state: Arc<AppState>) -> Response<BoxBody> {
    match state.engagement.feed().await {
        Ok(posts) => json_response(StatusCode::OK, &posts),
        Err(e) => error_response(e),
    }
}

/// POST /api/posts
async fn handle_create_post(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let user = match authenticated_user(&req, &state).await {
        Ok(user) => user,
        Err(e) => return error_response(e),
    };
    let body: CreatePostRequest = match parse_json_body(req).await {
        Ok(body) => body,
        Err(e) => return error_response(e),
    };

    let post_type = match body.post_type.as_deref().map(str::parse::<PostType>) {
        Some(Ok(post_type)) => Some(post_type),
        Some(Err(e)) => return error_response(e),
        None => None,
    };

    let new = NewPost {
        user_id: user.id,
        content: body.content,
        image: body.image,
        is_anonymous: body.is_anonymous,
        post_type,
        related_conditions: body.related_conditions,
    };

    match state.engagement.create_post(new).await {
        Ok(post) => json_response(StatusCode::CREATED, &post),
        Err(e) => error_response(e),
    }
}

/// POST /api/posts/:id/like
async fn handle_toggle_like(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    post_id: i32,
) -> Response<BoxBody> {
    let user = match authenticated_user(&req, &state).await {
        Ok(user) => user,
        Err(e) => return error_response(e),
    };

    match state.engagement.toggle_like(post_id, user.id).await {
        Ok(outcome) => json_response(StatusCode::OK, &outcome),
        Err(e) => error_response(e),
    }
}

/// GET /api/posts/:id/comments
async fn handle_comments(state: Arc<AppState>, post_id: i32) -> Response<BoxBody> {
    match state.engagement.comments(post_id).await {
        Ok(comments) => json_response(StatusCode::OK, &comments),
        Err(e) => error_response(e),
    }
}

/// POST /api/posts/:id/comments
async fn handle_add_comment(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    post_id: i32,
) -> Response<BoxBody> {
    let user = match authenticated_user(&req, &state).await {
        Ok(user) => user,
        Err(e) => return error_response(e),
    };
    let body: CreateCommentRequest = match parse_json_body(req).await {
        Ok(body) => body,
        Err(e) => return error_response(e),
    };

    match state
        .engagement
        .add_comment(post_id, user.id, body.content)
        .await
    {
        Ok(comment) => json_response(StatusCode::CREATED, &comment),
        Err(e) => error_response(e),
    }
}

/// Route dispatcher for the feed endpoints
pub async fn handle_posts_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Option<Response<BoxBody>> {
    let path = req.uri().path();
    let path = path.split('?').next().unwrap_or(path);
    let rest = path.strip_prefix("/api/posts")?.to_string();
    let method = req.method().clone();

    let response = match (&method, rest.as_str()) {
        (&Method::GET, "") => handle_feed(state).await,
        (&Method::POST, "") => handle_create_post(req, state).await,
        (_, "") => method_not_allowed(),

        (_, sub) => {
            let sub = sub.strip_prefix('/')?;

            if let Some(id_str) = sub.strip_suffix("/comments") {
                let post_id = match parse_id(id_str) {
                    Ok(id) => id,
                    Err(e) => return Some(error_response(e)),
                };
                match method {
                    Method::GET => handle_comments(state, post_id).await,
                    Method::POST => handle_add_comment(req, state, post_id).await,
                    _ => method_not_allowed(),
                }
            } else if let Some(id_str) = sub.strip_suffix("/like") {
                let post_id = match parse_id(id_str) {
                    Ok(id) => id,
                    Err(e) => return Some(error_response(e)),
                };
                match method {
                    Method::POST => handle_toggle_like(req, state, post_id).await,
                    _ => method_not_allowed(),
                }
            } else {
                return None;
            }
        }
    };

    Some(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_post_request_defaults() {
        let body: CreatePostRequest =
            serde_json::from_str(r#"{"content": "hello"}"#).unwrap();
        assert_eq!(body.content, "hello");
        assert!(!body.is_anonymous);
        assert!(body.post_type.is_none());
        assert!(body.related_conditions.is_none());
    }

    #[test]
    fn test_create_post_request_full() {
        let body: CreatePostRequest = serde_json::from_str(
            r#"{
                "content": "Managing hypertension",
                "isAnonymous": true,
                "postType": "question",
                "relatedConditions": ["Hypertension"]
            }"#,
        )
        .unwrap();
        assert!(body.is_anonymous);
        assert_eq!(body.post_type.as_deref(), Some("question"));
    }
}
