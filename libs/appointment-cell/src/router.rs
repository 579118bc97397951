// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use shared_config::AppConfig;

use crate::handlers::{self, BookingState};
use crate::services::BookingGateways;

pub fn booking_routes(config: Arc<AppConfig>) -> Router {
    let gateways = BookingGateways::from_config(&config);
    booking_routes_with_state(Arc::new(BookingState::new(config, gateways)))
}

/// Booking router over caller-supplied state, e.g. alternate gateways.
pub fn booking_routes_with_state(state: Arc<BookingState>) -> Router {
    Router::new()
        .route("/", post(handlers::start_booking))
        .route("/{session_id}", get(handlers::get_booking).delete(handlers::close_booking))
        .route("/{session_id}/branch", post(handlers::select_branch))
        .route("/{session_id}/date", post(handlers::select_date))
        .route("/{session_id}/slot", post(handlers::select_slot))
        .route("/{session_id}/family-member", post(handlers::select_family_member))
        .route("/{session_id}/family-member/new", post(handlers::create_family_member))
        .route("/{session_id}/family-member/dialog", post(handlers::open_family_dialog))
        .route("/{session_id}/family-members/refresh", post(handlers::refresh_family_members))
        .route("/{session_id}/payment-method", post(handlers::select_payment_method))
        .route("/{session_id}/next", post(handlers::next_step))
        .route("/{session_id}/prev", post(handlers::prev_step))
        .route("/{session_id}/step/{step}", post(handlers::go_to_step))
        .route("/{session_id}/review", get(handlers::review_booking))
        .route("/{session_id}/submit", post(handlers::submit_booking))
        .with_state(state)
}

pub fn appointment_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::list_appointments))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .route("/admin/{appointment_id}/process", post(handlers::process_appointment))
        .with_state(config)
}
