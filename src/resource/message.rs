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
use crate::models::{Message, MessageInput, Page};
use crate::startup::AppState;
use crate::validation::validate_message;

pub async fn send_message(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(mut input): ApiJson<MessageInput>,
) -> AppResult<(StatusCode, Json<Message>)> {
    validate_message(&input)?;
    input.body = input.body.trim().to_string();

    if input.recipient_id == user.id() {
        return Err(AppError::Validation(
            "You cannot send a message to yourself".to_string(),
        ));
    }
    if state
        .backend
        .find_user_by_id(&input.recipient_id)
        .await?
        .is_none()
    {
        return Err(AppError::Validation("Recipient does not exist".to_string()));
    }
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

    let message = state.backend.create_message(user.id(), &input).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn inbox(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<Page<Message>>> {
    let page = page_request(&state.config, &params)?;
    let (items, total) = state.backend.find_inbox(user.id(), &page).await?;
    Ok(Json(Page::new(items, total, page.page, page.limit)))
}

pub async fn sent(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<Page<Message>>> {
    let page = page_request(&state.config, &params)?;
    let (items, total) = state.backend.find_sent(user.id(), &page).await?;
    Ok(Json(Page::new(items, total, page.page, page.limit)))
}

/// Only the recipient can mark a message read
pub async fn mark_read(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Message>> {
    let message = state
        .backend
        .find_message_by_id(&id)
        .await?
        .ok_or_else(message_not_found)?;

    if message.recipient_id != user.id() {
        return Err(AppError::Forbidden(
            "Only the recipient can mark a message as read".to_string(),
        ));
    }

    state
        .backend
        .mark_message_read(&id)
        .await?
        .map(Json)
        .ok_or_else(message_not_found)
}

fn message_not_found() -> AppError {
    AppError::NotFound("Message not found".to_string())
}
