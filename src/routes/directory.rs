//! Public directory endpoints
//!
//! - GET /api/doctors      - All doctors with their profiles
//! - GET /api/doctors/:id  - One doctor by user id
//! - GET /api/patients/:id - One patient by user id

use hyper::{Method, Request, Response, StatusCode};
use std::sync::Arc;

use crate::server::AppState;
use crate::types::ApiError;

use super::{error_response, json_response, method_not_allowed, parse_id, BoxBody};

/// GET /api/doctors
async fn handle_doctors(state: Arc<AppState>) -> Response<BoxBody> {
    match state.store.doctors().await {
        Ok(doctors) => json_response(StatusCode::OK, &doctors),
        Err(e) => error_response(e),
    }
}

/// GET /api/doctors/:id
async fn handle_doctor(state: Arc<AppState>, user_id: i32) -> Response<BoxBody> {
    match state.store.doctor_by_user_id(user_id).await {
        Ok(Some(doctor)) => json_response(StatusCode::OK, &doctor),
        Ok(None) => error_response(ApiError::NotFound("Doctor not found".to_string())),
        Err(e) => error_response(e),
    }
}

/// GET /api/patients/:id
async fn handle_patient(state: Arc<AppState>, user_id: i32) -> Response<BoxBody> {
    match state.store.patient_by_user_id(user_id).await {
        Ok(Some(patient)) => json_response(StatusCode::OK, &patient),
        Ok(None) => error_response(ApiError::NotFound("Patient not found".to_string())),
        Err(e) => error_response(e),
    }
}

/// Route dispatcher for the directory endpoints
pub async fn handle_directory_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Option<Response<BoxBody>> {
    let path = req.uri().path();
    let path = path.split('?').next().unwrap_or(path);
    let method = req.method();

    let response = if let Some(rest) = path.strip_prefix("/api/doctors") {
        if !rest.is_empty() && !rest.starts_with('/') {
            return None;
        }
        match (method, rest) {
            (&Method::GET, "") => handle_doctors(state).await,
            (_, "") => method_not_allowed(),
            (&Method::GET, sub) => {
                let id_str = sub.strip_prefix('/')?;
                match parse_id(id_str) {
                    Ok(user_id) => handle_doctor(state, user_id).await,
                    Err(e) => error_response(e),
                }
            }
            _ => method_not_allowed(),
        }
    } else if let Some(rest) = path.strip_prefix("/api/patients") {
        let id_str = rest.strip_prefix('/')?;
        match method {
            &Method::GET => match parse_id(id_str) {
                Ok(user_id) => handle_patient(state, user_id).await,
                Err(e) => error_response(e),
            },
            _ => method_not_allowed(),
        }
    } else {
        return None;
    };

    Some(response)
}
