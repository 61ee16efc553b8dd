pub mod admin;
pub mod auth;
pub mod broker;
pub mod contact;
pub mod message;
pub mod property;

use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::parser::PageRequest;
use crate::startup::AppState;

/// `page` and `limit` for list endpoints other than the listing search
pub(crate) fn page_request(
    config: &AppConfig,
    params: &HashMap<String, String>,
) -> AppResult<PageRequest> {
    PageRequest::from_params(
        params,
        config.listing.page_size,
        config.listing.max_page_size,
    )
}

pub async fn health(State(state): State<AppState>) -> AppResult<Json<Value>> {
    state.backend.health_check().await?;
    Ok(Json(json!({ "status": "ok" })))
}
