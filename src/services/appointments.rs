//! Appointment lifecycle between a doctor and a patient
//!
//! Appointments start `scheduled` and move exactly once to `completed` or
//! `cancelled`. Both of those are terminal. Only the two participants may
//! book or update an appointment.

use std::sync::Arc;

use crate::model::{Appointment, AppointmentStatus, NewAppointment, Role, User};
use crate::store::EntityStore;
use crate::types::{ApiError, Result};

#[derive(Clone)]
pub struct AppointmentService {
    store: Arc<dyn EntityStore>,
}

impl AppointmentService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Book an appointment. The caller must be the doctor or patient named
    /// in the booking, and both referenced users must exist with the
    /// matching role.
    pub async fn book(&self, caller: &User, new: NewAppointment) -> Result<Appointment> {
        let caller_is_named = match caller.role {
            Role::Doctor => new.doctor_id == caller.id,
            Role::Patient => new.patient_id == caller.id,
        };
        if !caller_is_named {
            return Err(ApiError::Forbidden(
                "Unauthorized appointment creation".to_string(),
            ));
        }

        let doctor = self
            .store
            .user_by_id(new.doctor_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Doctor not found".to_string()))?;
        if doctor.role != Role::Doctor {
            return Err(ApiError::BadRequest(
                "doctorId must reference a doctor".to_string(),
            ));
        }

        let patient = self
            .store
            .user_by_id(new.patient_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Patient not found".to_string()))?;
        if patient.role != Role::Patient {
            return Err(ApiError::BadRequest(
                "patientId must reference a patient".to_string(),
            ));
        }

        self.store.create_appointment(new).await
    }

    /// Upcoming-first list of the caller's appointments, doctors by their
    /// doctor seat, patients by their patient seat.
    pub async fn list_for(&self, caller: &User) -> Result<Vec<Appointment>> {
        match caller.role {
            Role::Doctor => self.store.appointments_by_doctor_id(caller.id).await,
            Role::Patient => self.store.appointments_by_patient_id(caller.id).await,
        }
    }

    /// Move an appointment to a new status. Completed and cancelled are
    /// terminal, so only `scheduled` appointments can move.
    pub async fn update_status(
        &self,
        caller: &User,
        appointment_id: i32,
        status: &str,
    ) -> Result<Appointment> {
        let status: AppointmentStatus = status
            .parse()
            .map_err(|_| ApiError::BadRequest("Invalid status".to_string()))?;

        let appointment = self
            .store
            .appointment_by_id(appointment_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Appointment not found".to_string()))?;

        if appointment.doctor_id != caller.id && appointment.patient_id != caller.id {
            return Err(ApiError::Forbidden(
                "Not a participant in this appointment".to_string(),
            ));
        }

        if appointment.status.is_terminal() {
            return Err(ApiError::Conflict(format!(
                "Appointment is already {}",
                appointment.status.as_str()
            )));
        }

        self.store
            .set_appointment_status(appointment_id, status)
            .await
    }
}
