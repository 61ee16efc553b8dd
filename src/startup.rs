use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;

use crate::auth::{admin_middleware, auth_middleware, optional_auth_middleware};
use crate::backend::{BackendFactory, MarketplaceBackend};
use crate::config::AppConfig;
use crate::credentials::CredentialService;
use crate::error::AppResult;
use crate::logging::logging_middleware;
use crate::resource::{admin, auth, broker, contact, health, message, property};

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn MarketplaceBackend>,
    pub config: Arc<AppConfig>,
    pub credentials: Arc<CredentialService>,
}

impl AppState {
    pub fn new(backend: Arc<dyn MarketplaceBackend>, config: AppConfig) -> Self {
        let credentials = Arc::new(CredentialService::from_config(backend.clone(), &config));
        Self {
            backend,
            config: Arc::new(config),
            credentials,
        }
    }
}

/// Connect the configured store, create the schema and seed the bootstrap
/// admin if one is configured
pub async fn build_state(config: AppConfig) -> AppResult<AppState> {
    let backend_config = config.database_backend_config()?;
    let backend = BackendFactory::create(&backend_config).await?;

    let state = AppState::new(backend, config);
    if let Some(admin) = &state.config.bootstrap_admin {
        state.credentials.bootstrap_admin(admin).await?;
    }

    Ok(state)
}

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/properties", get(property::search_properties))
        .route("/properties/{id}", get(property::get_property))
        .route("/brokers", get(broker::list_brokers))
        .route("/brokers/{id}", get(broker::get_broker));

    let contact_form = Router::new()
        .route("/contacts", post(contact::create_contact))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ));

    let authenticated = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/profile", put(auth::update_profile))
        .route("/auth/password", put(auth::change_password))
        .route("/properties", post(property::create_property))
        .route("/properties/mine", get(property::my_properties))
        .route(
            "/properties/{id}",
            put(property::update_property).delete(property::delete_property),
        )
        .route(
            "/properties/{id}/status",
            patch(property::update_property_status),
        )
        .route(
            "/brokers/profile",
            post(broker::create_profile).put(broker::update_profile),
        )
        .route("/brokers/profile/me", get(broker::my_profile))
        .route("/messages", post(message::send_message))
        .route("/messages/inbox", get(message::inbox))
        .route("/messages/sent", get(message::sent))
        .route("/messages/{id}/read", patch(message::mark_read))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let admin = Router::new()
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/{id}/status", patch(admin::set_user_status))
        .route(
            "/admin/users/{id}/verification",
            patch(admin::set_user_verification),
        )
        .route("/admin/brokers", get(admin::list_brokers))
        .route(
            "/admin/brokers/{id}/verification",
            patch(admin::review_broker),
        )
        .route("/admin/contacts", get(contact::list_contacts))
        .route("/admin/contacts/{id}", get(contact::get_contact))
        .route(
            "/admin/contacts/{id}/reply",
            post(contact::reply_to_contact),
        )
        .route(
            "/admin/contacts/{id}/status",
            patch(contact::update_contact_status),
        )
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api = public.merge(contact_form).merge(authenticated).merge(admin);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}
