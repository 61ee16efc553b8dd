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
    Page, Property, PropertyInput, PropertyStatus, PropertyUpdate, Role, StatusChangeRequest,
    VerificationStatus,
};
use crate::parser::ListingQuery;
use crate::startup::AppState;
use crate::validation::validate_property;

/// Public listing search
pub async fn search_properties(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<Page<Property>>> {
    let listing = &state.config.listing;
    let query = ListingQuery::from_params(&params, listing.page_size, listing.max_page_size)?;

    let (items, total) = state
        .backend
        .search_properties(&query.filter, &query.page)
        .await?;

    Ok(Json(Page::new(
        items,
        total,
        query.page.page,
        query.page.limit,
    )))
}

/// Listings owned by the caller, whatever their status
pub async fn my_properties(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<Page<Property>>> {
    let page = page_request(&state.config, &params)?;
    let (items, total) = state
        .backend
        .find_properties_by_owner(user.id(), &page)
        .await?;

    Ok(Json(Page::new(items, total, page.page, page.limit)))
}

/// Detail view. Every fetch counts as a view.
pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Property>> {
    state
        .backend
        .record_property_view(&id)
        .await?
        .map(Json)
        .ok_or_else(property_not_found)
}

pub async fn create_property(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(mut input): ApiJson<PropertyInput>,
) -> AppResult<(StatusCode, Json<Property>)> {
    if user.role() == Role::Broker {
        let verified = state
            .backend
            .find_broker_profile_by_user(user.id())
            .await?
            .is_some_and(|profile| profile.verification_status == VerificationStatus::Verified);
        if !verified {
            return Err(AppError::Forbidden(
                "Only verified brokers can list properties".to_string(),
            ));
        }
    }

    validate_property(&mut input)?;
    let property = state.backend.create_property(user.id(), &input).await?;

    tracing::info!(property_id = %property.id, owner_id = %user.id(), "property listed");
    Ok((StatusCode::CREATED, Json(property)))
}

pub async fn update_property(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<PropertyUpdate>,
) -> AppResult<Json<Property>> {
    let existing = find_owned(&state, &user, &id).await?;

    let mut input = PropertyInput::from_property(&existing).apply(update);
    validate_property(&mut input)?;

    state
        .backend
        .update_property(&id, &input)
        .await?
        .map(Json)
        .ok_or_else(property_not_found)
}

pub async fn update_property_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<StatusChangeRequest<PropertyStatus>>,
) -> AppResult<Json<Property>> {
    find_owned(&state, &user, &id).await?;

    state
        .backend
        .update_property_status(&id, request.status)
        .await?
        .map(Json)
        .ok_or_else(property_not_found)
}

pub async fn delete_property(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    find_owned(&state, &user, &id).await?;

    if !state.backend.delete_property(&id).await? {
        return Err(property_not_found());
    }

    tracing::info!(property_id = %id, user_id = %user.id(), "property deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Load a property the caller is allowed to modify
async fn find_owned(state: &AppState, user: &CurrentUser, id: &str) -> AppResult<Property> {
    let property = state
        .backend
        .find_property_by_id(id)
        .await?
        .ok_or_else(property_not_found)?;

    user.require_owner_or_admin(&property.owner_id)?;
    Ok(property)
}

fn property_not_found() -> AppError {
    AppError::NotFound("Property not found".to_string())
}
