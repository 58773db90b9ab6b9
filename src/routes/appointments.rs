//! Appointment endpoints
//!
//! - GET  /api/appointments     - Caller's appointments, soonest first
//! - POST /api/appointments     - Book an appointment
//! - PUT  /api/appointments/:id - Move an appointment to a new status

use chrono::{DateTime, Utc};
use hyper::{Method, Request, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;

use crate::model::NewAppointment;
use crate::server::AppState;

use super::{
    authenticated_user, error_response, json_response, method_not_allowed, parse_id,
    parse_json_body, BoxBody,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub doctor_id: i32,
    pub patient_id: i32,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_virtual: bool,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub status: String,
}

/// GET /api/appointments
async fn handle_list(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let user = match authenticated_user(&req, &state).await {
        Ok(user) => user,
        Err(e) => return error_response(e),
    };

    match state.appointments.list_for(&user).await {
        Ok(appointments) => json_response(StatusCode::OK, &appointments),
        Err(e) => error_response(e),
    }
}

/// POST /api/appointments
async fn handle_book(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let user = match authenticated_user(&req, &state).await {
        Ok(user) => user,
        Err(e) => return error_response(e),
    };
    let body: CreateAppointmentRequest = match parse_json_body(req).await {
        Ok(body) => body,
        Err(e) => return error_response(e),
    };

    let new = NewAppointment {
        doctor_id: body.doctor_id,
        patient_id: body.patient_id,
        date: body.date,
        reason: body.reason,
        notes: body.notes,
        is_virtual: body.is_virtual,
        location: body.location,
    };

    match state.appointments.book(&user, new).await {
        Ok(appointment) => json_response(StatusCode::CREATED, &appointment),
        Err(e) => error_response(e),
    }
}

/// PUT /api/appointments/:id
async fn handle_update_status(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    appointment_id: i32,
) -> Response<BoxBody> {
    let user = match authenticated_user(&req, &state).await {
        Ok(user) => user,
        Err(e) => return error_response(e),
    };
    let body: UpdateAppointmentRequest = match parse_json_body(req).await {
        Ok(body) => body,
        Err(e) => return error_response(e),
    };

    match state
        .appointments
        .update_status(&user, appointment_id, &body.status)
        .await
    {
        Ok(appointment) => json_response(StatusCode::OK, &appointment),
        Err(e) => error_response(e),
    }
}

/// Route dispatcher for the appointment endpoints
pub async fn handle_appointments_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Option<Response<BoxBody>> {
    let path = req.uri().path();
    let path = path.split('?').next().unwrap_or(path);
    let rest = path.strip_prefix("/api/appointments")?.to_string();
    let method = req.method().clone();

    let response = match (&method, rest.as_str()) {
        (&Method::GET, "") => handle_list(req, state).await,
        (&Method::POST, "") => handle_book(req, state).await,
        (_, "") => method_not_allowed(),

        (_, sub) => {
            let id_str = sub.strip_prefix('/')?;
            let appointment_id = match parse_id(id_str) {
                Ok(id) => id,
                Err(e) => return Some(error_response(e)),
            };
            match method {
                Method::PUT => handle_update_status(req, state, appointment_id).await,
                _ => method_not_allowed(),
            }
        }
    };

    Some(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_request_parses_rfc3339_date() {
        let body: CreateAppointmentRequest = serde_json::from_str(
            r#"{
                "doctorId": 1,
                "patientId": 4,
                "date": "2025-04-10T14:30:00Z",
                "reason": "Chest pain follow-up",
                "isVirtual": true
            }"#,
        )
        .unwrap();

        assert_eq!(body.doctor_id, 1);
        assert_eq!(body.patient_id, 4);
        assert!(body.is_virtual);
        assert_eq!(body.date.to_rfc3339(), "2025-04-10T14:30:00+00:00");
    }

    #[test]
    fn test_booking_request_rejects_bad_date() {
        let result: Result<CreateAppointmentRequest, _> = serde_json::from_str(
            r#"{"doctorId": 1, "patientId": 4, "date": "next tuesday"}"#,
        );
        assert!(result.is_err());
    }
}
