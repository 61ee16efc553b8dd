//! Registration, login and account management
//!
//! `CredentialService` owns the password manager and token issuer and talks to
//! the credential store through [`UserBackend`](crate::backend::UserBackend).

use std::sync::Arc;

use crate::backend::MarketplaceBackend;
use crate::config::{AppConfig, BootstrapAdminConfig};
use crate::error::{AppError, AppResult, IdentityField};
use crate::models::{
    AuthSession, LoginRequest, NewUser, PublicUser, RegisterRequest, Role, UpdateProfileRequest,
    User,
};
use crate::password::PasswordManager;
use crate::token::{Claims, TokenIssuer};
use crate::validation::{
    normalize_email, normalize_phone, validate_password, validate_phone, validate_registration,
    validate_text,
};

pub struct CredentialService {
    backend: Arc<dyn MarketplaceBackend>,
    passwords: PasswordManager,
    tokens: TokenIssuer,
}

impl CredentialService {
    pub fn new(
        backend: Arc<dyn MarketplaceBackend>,
        passwords: PasswordManager,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            backend,
            passwords,
            tokens,
        }
    }

    pub fn from_config(backend: Arc<dyn MarketplaceBackend>, config: &AppConfig) -> Self {
        Self::new(
            backend,
            PasswordManager::new(config.auth.password_algorithm),
            TokenIssuer::new(&config.auth.jwt_secret, config.auth.token_ttl_days),
        )
    }

    /// Self-service sign up. The role defaults to customer; admin accounts
    /// cannot be created this way.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthSession> {
        let role = request.role.unwrap_or_default();
        if role == Role::Admin {
            return Err(AppError::Validation(
                "Role must be either customer or broker".to_string(),
            ));
        }

        let user = self.create_account(request, role).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "registered new account");

        self.session_for(user)
    }

    /// Validate, hash and insert a new account with an explicit role
    pub async fn create_account(&self, mut request: RegisterRequest, role: Role) -> AppResult<User> {
        validate_registration(&mut request)?;

        if self
            .backend
            .find_user_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateIdentity {
                field: IdentityField::Email,
            });
        }
        if self
            .backend
            .find_user_by_phone(&request.phone)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateIdentity {
                field: IdentityField::Phone,
            });
        }

        let password_hash = self.passwords.hash(&request.password).await?;

        // A concurrent registration can still lose the race on the unique
        // constraint; the store reports that as DuplicateIdentity as well.
        self.backend
            .create_user(&NewUser {
                name: request.name,
                email: request.email,
                phone: request.phone,
                password_hash,
                role,
            })
            .await
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthSession> {
        let email = normalize_email(&request.email);

        let user = match self.backend.find_user_by_email(&email).await? {
            Some(user) => user,
            None => {
                self.passwords.burn_decoy(&request.password).await;
                tracing::warn!("login failed: unknown email");
                return Err(AppError::InvalidCredentials);
            }
        };

        if !self
            .passwords
            .verify(&request.password, &user.password_hash)
            .await?
        {
            tracing::warn!(user_id = %user.id, "login failed: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_active {
            tracing::warn!(user_id = %user.id, "login refused: account disabled");
            return Err(AppError::AccountDisabled);
        }

        if self.passwords.needs_rehash(&user.password_hash) {
            self.upgrade_hash(&user.id, &request.password).await;
        }

        tracing::info!(user_id = %user.id, "user logged in");
        self.session_for(user)
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        self.tokens.verify(token)
    }

    /// Resolve a bearer token to the current, active account
    pub async fn authenticate(&self, token: &str) -> AppResult<User> {
        let claims = self.verify_token(token)?;

        let user = self
            .backend
            .find_user_by_id(&claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("User no longer exists".to_string()))?;

        if !user.is_active {
            return Err(AppError::AccountDisabled);
        }
        Ok(user)
    }

    pub async fn change_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        validate_password(new_password)?;

        let user = self
            .backend
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !self
            .passwords
            .verify(current_password, &user.password_hash)
            .await?
        {
            tracing::warn!(user_id = %user.id, "password change refused: wrong current password");
            return Err(AppError::InvalidCredentials);
        }

        let password_hash = self.passwords.hash(new_password).await?;
        if !self
            .backend
            .update_password_hash(user_id, &password_hash)
            .await?
        {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        tracing::info!(user_id = %user_id, "password changed");
        Ok(())
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        request: UpdateProfileRequest,
    ) -> AppResult<User> {
        let user = self
            .backend
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let name = match request.name {
            Some(name) => {
                let name = name.trim().to_string();
                validate_text("Name", &name, 100)?;
                name
            }
            None => user.name.clone(),
        };

        let phone = match request.phone {
            Some(phone) => {
                let phone = normalize_phone(phone.trim());
                validate_phone(&phone)?;
                phone
            }
            None => user.phone.clone(),
        };

        if phone != user.phone {
            if let Some(other) = self.backend.find_user_by_phone(&phone).await? {
                if other.id != user.id {
                    return Err(AppError::DuplicateIdentity {
                        field: IdentityField::Phone,
                    });
                }
            }
        }

        self.backend
            .update_user_profile(user_id, &name, &phone)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn set_active(&self, user_id: &str, is_active: bool) -> AppResult<User> {
        let user = self
            .backend
            .set_user_active(user_id, is_active)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        tracing::info!(user_id = %user.id, is_active, "account activation changed");
        Ok(user)
    }

    pub async fn set_verified(&self, user_id: &str, is_verified: bool) -> AppResult<User> {
        let user = self
            .backend
            .set_user_verified(user_id, is_verified)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        tracing::info!(user_id = %user.id, is_verified, "account verification changed");
        Ok(user)
    }

    /// Create the configured admin unless an account with that email exists
    pub async fn bootstrap_admin(&self, admin: &BootstrapAdminConfig) -> AppResult<Option<User>> {
        let email = normalize_email(&admin.email);
        if self.backend.find_user_by_email(&email).await?.is_some() {
            tracing::debug!("bootstrap admin already present");
            return Ok(None);
        }

        let user = self
            .create_account(
                RegisterRequest {
                    name: admin.name.clone(),
                    email,
                    phone: admin.phone.clone(),
                    password: admin.password.clone(),
                    role: Some(Role::Admin),
                },
                Role::Admin,
            )
            .await?;

        tracing::info!(user_id = %user.id, "created bootstrap admin");
        Ok(Some(user))
    }

    /// Re-hash a verified password with the configured algorithm. Failures
    /// leave the old hash in place.
    async fn upgrade_hash(&self, user_id: &str, password: &str) {
        let upgraded = match self.passwords.hash(password).await {
            Ok(hash) => self.backend.update_password_hash(user_id, &hash).await,
            Err(e) => Err(e),
        };

        match upgraded {
            Ok(_) => tracing::debug!(
                user_id = %user_id,
                algorithm = %self.passwords.algorithm(),
                "password hash upgraded"
            ),
            Err(e) => tracing::warn!(user_id = %user_id, "password hash upgrade failed: {}", e),
        }
    }

    fn session_for(&self, user: User) -> AppResult<AuthSession> {
        let token = self.tokens.issue(&user)?;
        Ok(AuthSession {
            token,
            user: PublicUser::from(user),
        })
    }
}
