use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::{AppError, AppResult};
use crate::models::{Role, User};
use crate::startup::AppState;

/// Authenticated account attached to the request by [`auth_middleware`]
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.0.id
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    pub fn is_admin(&self) -> bool {
        self.0.role == Role::Admin
    }

    pub fn require_role(&self, role: Role) -> AppResult<()> {
        if self.0.role != role {
            return Err(AppError::Forbidden(format!(
                "This action requires the {} role",
                role
            )));
        }
        Ok(())
    }

    pub fn require_admin(&self) -> AppResult<()> {
        self.require_role(Role::Admin)
    }

    /// Owners and admins may modify a resource
    pub fn require_owner_or_admin(&self, owner_id: &str) -> AppResult<()> {
        if self.0.id != owner_id && !self.is_admin() {
            return Err(AppError::Forbidden(
                "You are not allowed to modify this resource".to_string(),
            ));
        }
        Ok(())
    }
}

/// Bearer token authentication for protected routes
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::Unauthenticated("Authentication required".to_string()))?;

    let user = state.credentials.authenticate(token).await?;
    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

/// Attach the user when a valid token is present, continue anonymously
/// otherwise
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(request.headers()) {
        match state.credentials.authenticate(token).await {
            Ok(user) => {
                request.extensions_mut().insert(CurrentUser(user));
            }
            Err(e) => {
                tracing::debug!(error = %e, "ignoring unusable bearer token");
            }
        }
    }

    next.run(request).await
}

/// Admin-only routes. Runs after [`auth_middleware`].
pub async fn admin_middleware(request: Request, next: Next) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| AppError::Unauthenticated("Authentication required".to_string()))?;
    user.require_admin()?;

    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthenticated("Authentication required".to_string()))
    }
}

impl<S> OptionalFromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<CurrentUser>().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Utc;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn user(role: Role) -> CurrentUser {
        let now = Utc::now();
        CurrentUser(User {
            id: "u-1".to_string(),
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            phone: "+15550000000".to_string(),
            password_hash: String::new(),
            role,
            is_verified: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_role_checks() {
        assert!(user(Role::Admin).require_admin().is_ok());
        assert!(matches!(
            user(Role::Broker).require_admin(),
            Err(AppError::Forbidden(_))
        ));
        assert!(user(Role::Customer).require_owner_or_admin("u-1").is_ok());
        assert!(user(Role::Customer).require_owner_or_admin("u-2").is_err());
        assert!(user(Role::Admin).require_owner_or_admin("u-2").is_ok());
    }
}
