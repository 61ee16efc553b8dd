use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::auth::CurrentUser;
use crate::error::AppResult;
use crate::extractors::ApiJson;
use crate::models::{
    AuthSession, ChangePasswordRequest, LoginRequest, PublicUser, RegisterRequest,
    UpdateProfileRequest,
};
use crate::startup::AppState;

pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthSession>)> {
    let session = state.credentials.register(request).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> AppResult<Json<AuthSession>> {
    Ok(Json(state.credentials.login(request).await?))
}

pub async fn me(user: CurrentUser) -> Json<PublicUser> {
    Json(PublicUser::from(user.0))
}

pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<UpdateProfileRequest>,
) -> AppResult<Json<PublicUser>> {
    let updated = state.credentials.update_profile(user.id(), request).await?;
    Ok(Json(PublicUser::from(updated)))
}

pub async fn change_password(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> AppResult<Json<Value>> {
    state
        .credentials
        .change_password(user.id(), &request.current_password, &request.new_password)
        .await?;

    Ok(Json(json!({ "message": "Password updated successfully" })))
}
