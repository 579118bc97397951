// libs/appointment-cell/src/services/appointments.rs
use anyhow::Result;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::BackendClient;

use crate::error::AppointmentError;
use crate::models::{
    Appointment, AppointmentStatus, BookAppointmentRequest, BookingReceipt,
    CancelAppointmentRequest, ProcessAppointmentRequest,
};
use crate::services::lifecycle::AppointmentLifecycleService;

pub struct AppointmentService {
    backend: BackendClient,
    lifecycle_service: AppointmentLifecycleService,
}

impl AppointmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config),
            lifecycle_service: AppointmentLifecycleService::new(),
        }
    }

    /// Post a completed booking. A `status: false` receipt is returned as-is;
    /// deciding what it means is up to the caller.
    pub async fn book_appointment(
        &self,
        request: &BookAppointmentRequest,
        auth_token: &str,
    ) -> Result<BookingReceipt> {
        info!("Booking appointment with doctor {} at branch {} on {} {}",
              request.doctor_id, request.branch_id, request.date, request.start_time);

        let body = serde_json::to_value(request)?;
        let receipt: BookingReceipt = self.backend
            .request(Method::POST, "/appointments", Some(auth_token), Some(body))
            .await?;

        if receipt.status {
            debug!("Booking accepted: {:?}", receipt.id);
        } else {
            warn!("Booking declined by backend: {:?}", receipt.message);
        }

        Ok(receipt)
    }

    pub async fn list_appointments(&self, auth_token: &str) -> Result<Vec<Appointment>> {
        debug!("Fetching appointments for current patient");

        self.backend
            .request(Method::GET, "/appointments/mine", Some(auth_token), None)
            .await
    }

    pub async fn get_appointment(&self, appointment_id: Uuid, auth_token: &str) -> Result<Appointment> {
        debug!("Fetching appointment: {}", appointment_id);

        let path = format!("/appointments/{}", appointment_id);
        self.backend.request(Method::GET, &path, Some(auth_token), None).await
    }

    /// Cancel an appointment. Nothing is sent unless the request carries an
    /// explicit confirmation.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        request: CancelAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        if !request.confirmed {
            debug!("Cancellation of {} not confirmed, nothing sent", appointment_id);
            return Err(AppointmentError::CancellationNotConfirmed);
        }

        let current = self.get_appointment(appointment_id, auth_token).await?;
        self.lifecycle_service
            .validate_status_transition(current.status, AppointmentStatus::Cancelled)?;

        let path = format!("/appointments/{}/cancel", appointment_id);
        let body = json!({ "reason": request.reason });
        let cancelled: Appointment = self.backend
            .request(Method::POST, &path, Some(auth_token), Some(body))
            .await?;

        info!("Appointment {} cancelled", appointment_id);
        Ok(cancelled)
    }

    /// Apply a staff decision to an appointment.
    pub async fn process_appointment(
        &self,
        appointment_id: Uuid,
        request: ProcessAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let current = self.get_appointment(appointment_id, auth_token).await?;
        let target = request.decision.target_status();
        self.lifecycle_service.validate_status_transition(current.status, target)?;

        let path = format!("/appointments/{}", appointment_id);
        let mut body = json!({ "status": target });
        if let Some(note) = request.note {
            body["note"] = json!(note);
        }

        let updated: Appointment = self.backend
            .request(Method::PATCH, &path, Some(auth_token), Some(body))
            .await?;

        info!("Appointment {} moved from {} to {}", appointment_id, current.status, updated.status);
        Ok(updated)
    }
}
