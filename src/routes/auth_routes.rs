//! Registration, login, logout, and current-user endpoints
//!
//! - POST /api/register     - Create an account (and role profile) and sign in
//! - POST /api/login        - Authenticate and receive a session cookie
//! - POST /api/logout       - Drop the session
//! - GET  /api/user         - Current user from the session cookie
//! - GET  /api/user/profile - Current user together with their role profile

use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::auth::{hash_password, verify_password};
use crate::model::{
    NewDoctorProfile, NewPatientProfile, NewUser, Profile, Role, User,
};
use crate::server::AppState;
use crate::types::ApiError;

use super::{
    authenticated_user, clear_session_cookie, error_response, json_response, method_not_allowed,
    parse_json_body, session_cookie, with_cookie, BoxBody, SuccessResponse,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    // Doctor profile fields, honored when role is doctor
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub hospital: Option<String>,
    #[serde(default)]
    pub qualifications: Option<String>,
    #[serde(default)]
    pub experience: Option<i32>,
    // Patient profile fields, honored when role is patient
    #[serde(default)]
    pub conditions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    pub user: User,
    pub profile: Option<Profile>,
}

/// POST /api/register
///
/// Creates the account, optionally its role profile, and signs the new
/// user in right away.
async fn handle_register(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let body: RegisterRequest = match parse_json_body(req).await {
        Ok(body) => body,
        Err(e) => return error_response(e),
    };

    match register(&state, body).await {
        Ok((user, cookie)) => with_cookie(json_response(StatusCode::CREATED, &user), cookie),
        Err(e) => error_response(e),
    }
}

async fn register(state: &AppState, body: RegisterRequest) -> Result<(User, String), ApiError> {
    if body.username.trim().is_empty()
        || body.password.is_empty()
        || body.name.trim().is_empty()
        || body.email.trim().is_empty()
    {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    }

    let role: Role = body.role.parse()?;

    if state.store.user_by_username(&body.username).await?.is_some() {
        return Err(ApiError::BadRequest("Username already exists".to_string()));
    }
    if state.store.user_by_email(&body.email).await?.is_some() {
        return Err(ApiError::BadRequest("Email already exists".to_string()));
    }

    let password = hash_password(&body.password)?;
    let user = state
        .store
        .create_user(NewUser {
            username: body.username,
            password,
            name: body.name,
            email: body.email,
            bio: body.bio,
            profile_image: body.profile_image,
            cover_image: body.cover_image,
            role,
        })
        .await?;

    match role {
        Role::Doctor => {
            if let Some(specialty) = body.specialty {
                state
                    .store
                    .create_doctor_profile(NewDoctorProfile {
                        user_id: user.id,
                        specialty,
                        hospital: body.hospital,
                        qualifications: body.qualifications,
                        experience: body.experience,
                        ..NewDoctorProfile::default()
                    })
                    .await?;
            }
        }
        Role::Patient => {
            if body.conditions.is_some() {
                state
                    .store
                    .create_patient_profile(NewPatientProfile {
                        user_id: user.id,
                        conditions: body.conditions,
                    })
                    .await?;
            }
        }
    }

    info!("Registered {} account for {}", role, user.username);

    let session = state.sessions.create(user.id);
    let cookie = session_cookie(&session.session_id, state.args.session_ttl_secs);
    Ok((user, cookie))
}

/// POST /api/login
async fn handle_login(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let body: LoginRequest = match parse_json_body(req).await {
        Ok(body) => body,
        Err(e) => return error_response(e),
    };

    match login(&state, body).await {
        Ok((user, cookie)) => with_cookie(json_response(StatusCode::OK, &user), cookie),
        Err(e) => error_response(e),
    }
}

async fn login(state: &AppState, body: LoginRequest) -> Result<(User, String), ApiError> {
    // One message for both failure modes so usernames cannot be probed
    let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

    let user = state
        .store
        .user_by_username(&body.username)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&body.password, &user.password)? {
        return Err(invalid());
    }

    info!("User {} logged in", user.username);

    let session = state.sessions.create(user.id);
    let cookie = session_cookie(&session.session_id, state.args.session_ttl_secs);
    Ok((user, cookie))
}

/// POST /api/logout
async fn handle_logout(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    if let Err(e) = authenticated_user(&req, &state).await {
        return error_response(e);
    }

    if let Some(session_id) = super::session_id_from_request(&req) {
        state.sessions.remove(&session_id);
    }

    with_cookie(
        json_response(
            StatusCode::OK,
            &SuccessResponse {
                message: "Logged out successfully".to_string(),
            },
        ),
        clear_session_cookie(),
    )
}

/// GET /api/user
async fn handle_current_user(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    match authenticated_user(&req, &state).await {
        Ok(user) => json_response(StatusCode::OK, &user),
        Err(e) => error_response(e),
    }
}

/// GET /api/user/profile
async fn handle_user_profile(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let user = match authenticated_user(&req, &state).await {
        Ok(user) => user,
        Err(e) => return error_response(e),
    };

    match state.store.profile_by_user_id(user.id).await {
        Ok(profile) => json_response(StatusCode::OK, &UserProfileResponse { user, profile }),
        Err(e) => error_response(e),
    }
}

/// Route dispatcher for the auth endpoints
pub async fn handle_auth_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Option<Response<BoxBody>> {
    let path = req.uri().path();
    let path = path.split('?').next().unwrap_or(path).to_string();
    let method = req.method().clone();

    let response = match (&method, path.as_str()) {
        (&Method::POST, "/api/register") => handle_register(req, state).await,
        (&Method::POST, "/api/login") => handle_login(req, state).await,
        (&Method::POST, "/api/logout") => handle_logout(req, state).await,
        (&Method::GET, "/api/user") => handle_current_user(req, state).await,
        (&Method::GET, "/api/user/profile") => handle_user_profile(req, state).await,

        (_, "/api/register")
        | (_, "/api/login")
        | (_, "/api/logout")
        | (_, "/api/user")
        | (_, "/api/user/profile") => method_not_allowed(),

        _ => return None,
    };

    Some(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_shape() {
        let body: RegisterRequest = serde_json::from_str(
            r#"{
                "username": "drjones",
                "password": "secret",
                "name": "Dr. Jones",
                "email": "jones@example.com",
                "role": "doctor",
                "specialty": "Cardiology",
                "experience": 12
            }"#,
        )
        .unwrap();

        assert_eq!(body.username, "drjones");
        assert_eq!(body.specialty.as_deref(), Some("Cardiology"));
        assert_eq!(body.experience, Some(12));
        assert!(body.conditions.is_none());
    }

    #[test]
    fn test_register_request_minimal() {
        let body: RegisterRequest = serde_json::from_str(
            r#"{
                "username": "pat",
                "password": "secret",
                "name": "Pat Smith",
                "email": "pat@example.com",
                "role": "patient"
            }"#,
        )
        .unwrap();

        assert!(body.specialty.is_none());
        assert!(body.bio.is_none());
    }
}
