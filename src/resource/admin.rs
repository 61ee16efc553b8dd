//! Admin-only operations. The router guards every handler here with the
//! admin middleware.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::collections::HashMap;
use std::str::FromStr;

use super::broker::{broker_not_found, broker_page, broker_view};
use super::page_request;
use crate::auth::CurrentUser;
use crate::error::{AppError, AppResult};
use crate::extractors::ApiJson;
use crate::models::{
    BrokerReviewRequest, BrokerView, Page, PublicUser, UserActiveRequest, UserVerifiedRequest,
    VerificationStatus,
};
use crate::startup::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<Page<PublicUser>>> {
    let page = page_request(&state.config, &params)?;
    let (users, total) = state.backend.find_all_users(&page).await?;

    Ok(Json(
        Page::new(users, total, page.page, page.limit).map(PublicUser::from),
    ))
}

pub async fn set_user_status(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UserActiveRequest>,
) -> AppResult<Json<PublicUser>> {
    if id == admin.id() && !request.is_active {
        return Err(AppError::Validation(
            "You cannot deactivate your own account".to_string(),
        ));
    }

    let user = state.credentials.set_active(&id, request.is_active).await?;
    Ok(Json(PublicUser::from(user)))
}

pub async fn set_user_verification(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UserVerifiedRequest>,
) -> AppResult<Json<PublicUser>> {
    let user = state
        .credentials
        .set_verified(&id, request.is_verified)
        .await?;
    Ok(Json(PublicUser::from(user)))
}

/// Broker profiles in any verification state, optionally filtered by `status`
pub async fn list_brokers(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<Page<BrokerView>>> {
    let status = params
        .get("status")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(VerificationStatus::from_str)
        .transpose()?;
    let page = page_request(&state.config, &params)?;

    let (profiles, total) = state.backend.find_broker_profiles(status, &page).await?;
    Ok(Json(
        broker_page(&state, profiles, total, page.page, page.limit).await?,
    ))
}

/// Approve or reject a pending broker profile
pub async fn review_broker(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<BrokerReviewRequest>,
) -> AppResult<Json<BrokerView>> {
    let reason = request
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());

    match request.status {
        VerificationStatus::Pending => {
            return Err(AppError::Validation(
                "Status must be either verified or rejected".to_string(),
            ));
        }
        VerificationStatus::Rejected if reason.is_none() => {
            return Err(AppError::Validation(
                "A reason is required when rejecting a broker".to_string(),
            ));
        }
        _ => {}
    }

    let current = state
        .backend
        .find_broker_profile_by_id(&id)
        .await?
        .ok_or_else(broker_not_found)?;

    if !current
        .verification_status
        .can_transition_to(request.status)
    {
        return Err(AppError::Conflict(format!(
            "Broker profile is already {}",
            current.verification_status
        )));
    }

    let reason = match request.status {
        VerificationStatus::Rejected => reason,
        _ => None,
    };

    // The store only moves profiles that are still pending
    let profile = state
        .backend
        .review_broker_profile(&id, request.status, reason, admin.id())
        .await?
        .ok_or_else(|| AppError::Conflict("Broker profile was already reviewed".to_string()))?;

    if profile.verification_status == VerificationStatus::Verified {
        state
            .credentials
            .set_verified(&profile.user_id, true)
            .await?;
    }

    tracing::info!(
        profile_id = %profile.id,
        status = %profile.verification_status,
        admin_id = %admin.id(),
        "broker profile reviewed"
    );
    Ok(Json(broker_view(&state, profile).await?))
}
