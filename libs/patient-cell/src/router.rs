use std::sync::Arc;
use axum::{routing::get, Router};
use shared_config::AppConfig;

use crate::handlers::*;

pub fn create_patient_router(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/me", get(get_patient_profile))
        .route("/me/family", get(list_family_members).post(create_family_member))
        .with_state(config)
}
