use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/filters", get(handlers::get_filter_options))
        .route("/clinics/{branch_id}", get(handlers::get_clinic))
        .route("/doctor-clinics/{doctor_clinic_id}/cost", get(handlers::get_cost_breakdown))
        .route("/{doctor_id}", get(handlers::get_doctor))
        .route("/{doctor_id}/branches/{branch_id}/slots", get(handlers::get_slots))
        .with_state(state)
}
