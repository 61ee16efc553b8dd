use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::collections::HashMap;

use super::page_request;
use crate::auth::CurrentUser;
use crate::error::{AppError, AppResult};
use crate::extractors::ApiJson;
use crate::models::{
    BrokerProfile, BrokerProfileInput, BrokerView, Page, PublicUser, Role, VerificationStatus,
};
use crate::startup::AppState;
use crate::validation::validate_broker_profile;

/// Join a profile with its account
pub(crate) async fn broker_view(state: &AppState, profile: BrokerProfile) -> AppResult<BrokerView> {
    let user = state
        .backend
        .find_user_by_id(&profile.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Broker account not found".to_string()))?;

    Ok(BrokerView {
        profile,
        user: PublicUser::from(user),
    })
}

pub(crate) async fn broker_page(
    state: &AppState,
    profiles: Vec<BrokerProfile>,
    total: i64,
    page: i64,
    limit: i64,
) -> AppResult<Page<BrokerView>> {
    let mut items = Vec::with_capacity(profiles.len());
    for profile in profiles {
        items.push(broker_view(state, profile).await?);
    }
    Ok(Page::new(items, total, page, limit))
}

/// Public directory of verified brokers
pub async fn list_brokers(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<Page<BrokerView>>> {
    let page = page_request(&state.config, &params)?;
    let (profiles, total) = state
        .backend
        .find_broker_profiles(Some(VerificationStatus::Verified), &page)
        .await?;

    Ok(Json(
        broker_page(&state, profiles, total, page.page, page.limit).await?,
    ))
}

/// Public broker detail. Unverified profiles are not visible here.
pub async fn get_broker(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<BrokerView>> {
    let profile = state
        .backend
        .find_broker_profile_by_id(&id)
        .await?
        .filter(|p| p.verification_status == VerificationStatus::Verified)
        .ok_or_else(broker_not_found)?;

    Ok(Json(broker_view(&state, profile).await?))
}

pub async fn create_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(mut input): ApiJson<BrokerProfileInput>,
) -> AppResult<(StatusCode, Json<BrokerProfile>)> {
    user.require_role(Role::Broker)?;
    validate_broker_profile(&mut input)?;

    let profile = state
        .backend
        .create_broker_profile(user.id(), &input)
        .await?;

    tracing::info!(profile_id = %profile.id, user_id = %user.id(), "broker profile submitted");
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn my_profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<BrokerProfile>> {
    state
        .backend
        .find_broker_profile_by_user(user.id())
        .await?
        .map(Json)
        .ok_or_else(broker_not_found)
}

pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(mut input): ApiJson<BrokerProfileInput>,
) -> AppResult<Json<BrokerProfile>> {
    user.require_role(Role::Broker)?;
    validate_broker_profile(&mut input)?;

    state
        .backend
        .update_broker_profile(user.id(), &input)
        .await?
        .map(Json)
        .ok_or_else(broker_not_found)
}

pub(crate) fn broker_not_found() -> AppError {
    AppError::NotFound("Broker profile not found".to_string())
}
