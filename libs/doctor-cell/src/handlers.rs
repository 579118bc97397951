use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::into_app_error;
use shared_models::error::AppError;

use crate::models::{SlotQuery, SlotsQueryParams};
use crate::services::{AvailabilityService, DoctorService, PricingService};

#[axum::debug_handler]
pub async fn get_doctor(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&config);

    let doctor = service.get_doctor(doctor_id, auth.token())
        .await
        .map_err(into_app_error)?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn get_clinic(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(branch_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&config);

    let clinic = service.get_clinic(branch_id, auth.token())
        .await
        .map_err(into_app_error)?;

    Ok(Json(json!(clinic)))
}

#[axum::debug_handler]
pub async fn get_filter_options(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&config);

    let filters = service.get_filter_options(auth.token())
        .await
        .map_err(into_app_error)?;

    Ok(Json(json!(filters)))
}

#[axum::debug_handler]
pub async fn get_slots(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path((doctor_id, branch_id)): Path<(Uuid, Uuid)>,
    Query(params): Query<SlotsQueryParams>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&config);
    let query = SlotQuery { doctor_id, branch_id, date: params.date };

    let slots = service.get_slots(&query, auth.token())
        .await
        .map_err(into_app_error)?;

    Ok(Json(json!({
        "query": query,
        "slots": slots,
        "total": slots.len()
    })))
}

#[axum::debug_handler]
pub async fn get_cost_breakdown(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(doctor_clinic_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = PricingService::new(&config);

    let quote = service.quote(doctor_clinic_id, auth.token())
        .await
        .map_err(into_app_error)?;

    Ok(Json(json!(quote)))
}
