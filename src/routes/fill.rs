use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::questionnaire_dto::SubmitAnswersRequest, error::Result, identity::IdentityProvider,
    middleware::auth::Claims, AppState,
};

#[axum::debug_handler]
pub async fn get_fill_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user_id = claims.current_user_id()?;
    let view = state.questionnaire_service.fill_view(&id, &user_id).await?;
    Ok(Json(view))
}

#[axum::debug_handler]
pub async fn submit_answers(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmitAnswersRequest>,
) -> Result<impl IntoResponse> {
    let result = state
        .questionnaire_service
        .submit(&id, payload, &claims)
        .await?;
    Ok(Json(result))
}
