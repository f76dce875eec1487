use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::questionnaire_dto::{QuestionnairePayload, RecordPassRequest}, error::Result, middleware::auth::Claims,
    AppState,
};

#[axum::debug_handler]
pub async fn list_questionnaires(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let summaries = state
        .questionnaire_service
        .list_for_user(&claims.sub)
        .await?;
    Ok(Json(summaries))
}

#[axum::debug_handler]
pub async fn list_records(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let records = state.questionnaire_service.list_records().await?;
    Ok(Json(records))
}

#[axum::debug_handler]
pub async fn create_questionnaire(
    State(state): State<AppState>,
    Json(payload): Json<QuestionnairePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let created = state.questionnaire_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[axum::debug_handler]
pub async fn get_questionnaire(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let questionnaire = state.questionnaire_service.get(&id).await?;
    Ok(Json(questionnaire))
}

#[axum::debug_handler]
pub async fn update_questionnaire(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<QuestionnairePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let updated = state.questionnaire_service.replace(&id, payload).await?;
    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn record_pass(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<RecordPassRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let updated = state
        .questionnaire_service
        .record_pass(&id, &payload.user_id)
        .await?;
    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn delete_questionnaire(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    state.questionnaire_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
