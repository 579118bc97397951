// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use chrono::Utc;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use doctor_cell::services::PricingService;
use patient_cell::models::CreateFamilyMemberRequest;
use shared_config::AppConfig;
use shared_database::into_app_error;
use shared_models::error::AppError;
use shared_models::notice::Notice;

use crate::models::{
    CancelAppointmentRequest, ProcessAppointmentRequest, ReviewSummary, SelectBranchRequest,
    SelectDateRequest, SelectFamilyMemberRequest, SelectPaymentMethodRequest, SelectSlotRequest,
    StartBookingRequest,
};
use crate::services::{AppointmentService, BookingGateways, BookingSession, BookingSessionStore};

/// Shared state of the booking router.
pub struct BookingState {
    pub config: Arc<AppConfig>,
    pub sessions: BookingSessionStore,
    pub gateways: BookingGateways,
}

impl BookingState {
    pub fn new(config: Arc<AppConfig>, gateways: BookingGateways) -> Self {
        let idle_timeout = Duration::from_secs(config.booking_session_idle_secs);
        Self {
            config,
            sessions: BookingSessionStore::with_idle_timeout(idle_timeout),
            gateways,
        }
    }
}

// ==============================================================================
// BOOKING WIZARD HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn start_booking(
    State(state): State<Arc<BookingState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<StartBookingRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let token = auth.token();

    let doctor = state.gateways.clinics
        .doctor(request.doctor_id, token)
        .await
        .map_err(into_app_error)?;
    let today = request.date.unwrap_or_else(|| Utc::now().date_naive());

    let (session, pending) = BookingSession::start(doctor, today, state.gateways.clone());
    let shared = state.sessions.create(session).await;

    // Initial board loads outside the session lock.
    let result = pending.run(token).await;

    let mut session = shared.lock().await;
    let lookup = session.finish_lookup(result);

    let view = session.view().await;

    Ok((StatusCode::CREATED, Json(json!({
        "session": view,
        "lookup": lookup
    }))))
}

#[axum::debug_handler]
pub async fn get_booking(
    State(state): State<Arc<BookingState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let shared = state.sessions.get(session_id).await?;
    let session = shared.lock().await;

    let view = session.view().await;

    Ok(Json(json!(view)))
}

#[axum::debug_handler]
pub async fn close_booking(
    State(state): State<Arc<BookingState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let shared = state.sessions.remove(session_id).await?;
    shared.lock().await.close().await;

    Ok(Json(json!({
        "session_id": session_id,
        "closed": true
    })))
}

#[axum::debug_handler]
pub async fn select_branch(
    State(state): State<Arc<BookingState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SelectBranchRequest>,
) -> Result<Json<Value>, AppError> {
    let shared = state.sessions.get(session_id).await?;
    let pending = shared.lock().await.begin_branch_selection(request.branch_id)?;

    let result = pending.run(auth.token()).await;

    let mut session = shared.lock().await;
    let lookup = session.finish_lookup(result);

    let view = session.view().await;

    Ok(Json(json!({
        "session": view,
        "lookup": lookup
    })))
}

#[axum::debug_handler]
pub async fn select_date(
    State(state): State<Arc<BookingState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SelectDateRequest>,
) -> Result<Json<Value>, AppError> {
    let shared = state.sessions.get(session_id).await?;
    let pending = shared.lock().await.begin_date_selection(request.date)?;

    let result = pending.run(auth.token()).await;

    let mut session = shared.lock().await;
    let lookup = session.finish_lookup(result);

    let view = session.view().await;

    Ok(Json(json!({
        "session": view,
        "lookup": lookup
    })))
}

#[axum::debug_handler]
pub async fn select_slot(
    State(state): State<Arc<BookingState>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SelectSlotRequest>,
) -> Result<Json<Value>, AppError> {
    let shared = state.sessions.get(session_id).await?;
    let mut session = shared.lock().await;

    session.select_slot(request.slot_id).await?;

    let view = session.view().await;

    Ok(Json(json!(view)))
}

#[axum::debug_handler]
pub async fn select_family_member(
    State(state): State<Arc<BookingState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SelectFamilyMemberRequest>,
) -> Result<Json<Value>, AppError> {
    let shared = state.sessions.get(session_id).await?;
    let mut session = shared.lock().await;

    session.select_family_member(request.member_id, auth.token()).await?;

    let view = session.view().await;

    Ok(Json(json!(view)))
}

#[axum::debug_handler]
pub async fn refresh_family_members(
    State(state): State<Arc<BookingState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let shared = state.sessions.get(session_id).await?;
    let mut session = shared.lock().await;

    let total = session.reload_family_members(auth.token()).await?;

    let view = session.view().await;

    Ok(Json(json!({
        "session": view,
        "total": total
    })))
}

#[axum::debug_handler]
pub async fn open_family_dialog(
    State(state): State<Arc<BookingState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let shared = state.sessions.get(session_id).await?;
    let mut session = shared.lock().await;

    session.open_family_dialog()?;

    let view = session.view().await;

    Ok(Json(json!(view)))
}

/// Always answers 200: a failed create is reported through the notice.
#[axum::debug_handler]
pub async fn create_family_member(
    State(state): State<Arc<BookingState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(session_id): Path<Uuid>,
    Json(form): Json<CreateFamilyMemberRequest>,
) -> Result<Json<Value>, AppError> {
    let shared = state.sessions.get(session_id).await?;
    let mut session = shared.lock().await;

    let outcome = session.create_family_member(form, auth.token()).await?;
    let view = session.view().await;

    Ok(Json(json!({
        "notice": outcome.notice,
        "member": outcome.member,
        "session": view
    })))
}

#[axum::debug_handler]
pub async fn select_payment_method(
    State(state): State<Arc<BookingState>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SelectPaymentMethodRequest>,
) -> Result<Json<Value>, AppError> {
    let shared = state.sessions.get(session_id).await?;
    let mut session = shared.lock().await;

    session.select_payment_method(request.payment_method)?;

    let view = session.view().await;

    Ok(Json(json!(view)))
}

#[axum::debug_handler]
pub async fn next_step(
    State(state): State<Arc<BookingState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let shared = state.sessions.get(session_id).await?;
    let mut session = shared.lock().await;

    session.next_step()?;

    let view = session.view().await;

    Ok(Json(json!(view)))
}

#[axum::debug_handler]
pub async fn prev_step(
    State(state): State<Arc<BookingState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let shared = state.sessions.get(session_id).await?;
    let mut session = shared.lock().await;

    session.prev_step()?;

    let view = session.view().await;

    Ok(Json(json!(view)))
}

#[axum::debug_handler]
pub async fn go_to_step(
    State(state): State<Arc<BookingState>>,
    Path((session_id, step)): Path<(Uuid, u8)>,
) -> Result<Json<Value>, AppError> {
    let shared = state.sessions.get(session_id).await?;
    let mut session = shared.lock().await;

    session.go_to_step(step)?;

    let view = session.view().await;

    Ok(Json(json!(view)))
}

/// Review-step summary plus the price quote when the clinic is resolved.
#[axum::debug_handler]
pub async fn review_booking(
    State(state): State<Arc<BookingState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let shared = state.sessions.get(session_id).await?;
    let (confirmation, doctor_clinic_id) = {
        let session = shared.lock().await;
        let doctor_clinic_id = session.draft().doctor_clinic.as_ref().map(|dc| dc.id);
        (session.review(), doctor_clinic_id)
    };

    let confirmation = confirmation.ok_or_else(|| {
        AppError::ValidationError("Please select both date and time for your appointment".to_string())
    })?;

    let quote = match doctor_clinic_id {
        Some(id) => match PricingService::new(&state.config).quote(id, auth.token()).await {
            Ok(quote) => Some(quote),
            Err(e) => {
                warn!("Price quote unavailable for doctor clinic {}: {}", id, e);
                None
            }
        },
        None => None,
    };

    Ok(Json(json!(ReviewSummary { confirmation, quote })))
}

#[axum::debug_handler]
pub async fn submit_booking(
    State(state): State<Arc<BookingState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let shared = state.sessions.get(session_id).await?;
    let confirmation = shared.lock().await.submit(auth.token()).await?;

    if let Err(e) = state.sessions.remove(session_id).await {
        warn!("Booked session {} already gone from store: {}", session_id, e);
    }
    info!("Booking session {} submitted", session_id);

    Ok(Json(json!({
        "success": true,
        "confirmation": confirmation,
        "notice": Notice::success("Appointment booked successfully")
    })))
}

// ==============================================================================
// APPOINTMENT MANAGEMENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_appointments(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&config);

    let appointments = service.list_appointments(auth.token())
        .await
        .map_err(into_app_error)?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&config);

    let appointment = service.cancel_appointment(appointment_id, request, auth.token()).await?;

    Ok(Json(json!({
        "appointment": appointment,
        "notice": Notice::success("Appointment cancelled")
    })))
}

#[axum::debug_handler]
pub async fn process_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<ProcessAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&config);
    let decision = request.decision;

    let appointment = service.process_appointment(appointment_id, request, auth.token()).await?;

    Ok(Json(json!({
        "appointment": appointment,
        "decision": decision
    })))
}
