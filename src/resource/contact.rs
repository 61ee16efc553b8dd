use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::collections::HashMap;
use std::str::FromStr;

use super::page_request;
use crate::auth::CurrentUser;
use crate::error::{AppError, AppResult};
use crate::extractors::ApiJson;
use crate::models::{
    ContactInput, ContactMessage, ContactReplyRequest, ContactStatus, NewContact, Page,
    StatusChangeRequest,
};
use crate::startup::AppState;
use crate::validation::{validate_contact, validate_text};

/// Public contact form. Signed-in senders are linked to their account.
pub async fn create_contact(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    ApiJson(mut input): ApiJson<ContactInput>,
) -> AppResult<(StatusCode, Json<ContactMessage>)> {
    validate_contact(&mut input)?;

    if let Some(ref property_id) = input.property_id {
        if state
            .backend
            .find_property_by_id(property_id)
            .await?
            .is_none()
        {
            return Err(AppError::Validation(
                "Referenced property does not exist".to_string(),
            ));
        }
    }

    let contact = state
        .backend
        .create_contact(&NewContact {
            user_id: user.map(|u| u.0.id),
            input,
        })
        .await?;

    tracing::info!(contact_id = %contact.id, "contact inquiry received");
    Ok((StatusCode::CREATED, Json(contact)))
}

pub async fn list_contacts(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<Page<ContactMessage>>> {
    let status = params
        .get("status")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(ContactStatus::from_str)
        .transpose()?;
    let page = page_request(&state.config, &params)?;

    let (items, total) = state.backend.find_contacts(status, &page).await?;
    Ok(Json(Page::new(items, total, page.page, page.limit)))
}

/// Admin detail view. Opening a new inquiry marks it read.
pub async fn get_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ContactMessage>> {
    state
        .backend
        .mark_contact_read(&id)
        .await?
        .map(Json)
        .ok_or_else(contact_not_found)
}

pub async fn reply_to_contact(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<ContactReplyRequest>,
) -> AppResult<Json<ContactMessage>> {
    let reply = request.reply.trim();
    validate_text("Reply", reply, 5000)?;

    let contact = state
        .backend
        .reply_to_contact(&id, reply, admin.id())
        .await?
        .ok_or_else(contact_not_found)?;

    tracing::info!(contact_id = %contact.id, admin_id = %admin.id(), "contact inquiry answered");
    Ok(Json(contact))
}

pub async fn update_contact_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<StatusChangeRequest<ContactStatus>>,
) -> AppResult<Json<ContactMessage>> {
    let contact = state
        .backend
        .find_contact_by_id(&id)
        .await?
        .ok_or_else(contact_not_found)?;

    if request.status == ContactStatus::Replied && contact.reply.is_none() {
        return Err(AppError::Validation(
            "Use the reply endpoint to answer an inquiry".to_string(),
        ));
    }

    state
        .backend
        .update_contact_status(&id, request.status)
        .await?
        .map(Json)
        .ok_or_else(contact_not_found)
}

fn contact_not_found() -> AppError {
    AppError::NotFound("Contact message not found".to_string())
}
