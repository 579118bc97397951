use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_database::into_app_error;
use shared_models::error::AppError;

use crate::models::CreateFamilyMemberRequest;
use crate::services::{FamilyService, PatientService};

#[axum::debug_handler]
pub async fn get_patient_profile(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let profile = service.get_current_profile(auth.token())
        .await
        .map_err(into_app_error)?;

    Ok(Json(json!(profile)))
}

#[axum::debug_handler]
pub async fn list_family_members(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = FamilyService::new(&config);

    let members = service.list_members(auth.token())
        .await
        .map_err(into_app_error)?;

    Ok(Json(json!({
        "members": members,
        "total": members.len()
    })))
}

#[axum::debug_handler]
pub async fn create_family_member(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<CreateFamilyMemberRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = FamilyService::new(&config);

    let member = service.create_member(request, auth.token())
        .await
        .map_err(into_app_error)?;

    Ok((StatusCode::CREATED, Json(json!(member))))
}
