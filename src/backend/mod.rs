use crate::error::AppResult;
use crate::models::{
    BrokerProfile, BrokerProfileInput, ContactMessage, ContactStatus, Message, MessageInput,
    NewContact, NewUser, Property, PropertyInput, PropertyStatus, User, VerificationStatus,
};
use crate::parser::{ListingFilter, PageRequest};
use async_trait::async_trait;
use std::sync::Arc;

pub mod database;

/// Supported database backend types
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseType {
    PostgreSQL,
    SQLite,
}

/// Core backend abstraction
///
/// Each storage implementation (PostgreSQL, SQLite) owns its connection pool,
/// handed to it at construction.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Connect and initialize the storage backend
    async fn connect(config: &crate::backend::database::DatabaseBackendConfig) -> AppResult<Self>
    where
        Self: Sized;

    /// Check if the storage backend is healthy and accessible
    async fn health_check(&self) -> AppResult<()>;

    /// Create tables and indexes if they do not exist yet
    async fn init_schema(&self) -> AppResult<()>;
}

/// Credential store
///
/// Email and phone are unique. A duplicate insert or update fails with
/// `DuplicateIdentity` naming the offending field.
#[async_trait]
pub trait UserBackend: Backend {
    async fn create_user(&self, user: &NewUser) -> AppResult<User>;

    async fn find_user_by_id(&self, id: &str) -> AppResult<Option<User>>;

    /// Lookup by an already-normalized (lower-case) email
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn find_user_by_phone(&self, phone: &str) -> AppResult<Option<User>>;

    /// All users, newest first, with the total count
    async fn find_all_users(&self, page: &PageRequest) -> AppResult<(Vec<User>, i64)>;

    async fn update_user_profile(
        &self,
        id: &str,
        name: &str,
        phone: &str,
    ) -> AppResult<Option<User>>;

    async fn update_password_hash(&self, id: &str, password_hash: &str) -> AppResult<bool>;

    async fn set_user_active(&self, id: &str, is_active: bool) -> AppResult<Option<User>>;

    async fn set_user_verified(&self, id: &str, is_verified: bool) -> AppResult<Option<User>>;
}

/// Property listings
#[async_trait]
pub trait PropertyBackend: Backend {
    /// Insert a new listing with status `available` and zero views
    async fn create_property(&self, owner_id: &str, input: &PropertyInput) -> AppResult<Property>;

    async fn find_property_by_id(&self, id: &str) -> AppResult<Option<Property>>;

    /// Atomically bump the view counter and return the updated row
    async fn record_property_view(&self, id: &str) -> AppResult<Option<Property>>;

    /// Available listings matching `filter`, newest first, with the total
    /// count over the same predicate
    async fn search_properties(
        &self,
        filter: &ListingFilter,
        page: &PageRequest,
    ) -> AppResult<(Vec<Property>, i64)>;

    /// Every listing of one owner regardless of status
    async fn find_properties_by_owner(
        &self,
        owner_id: &str,
        page: &PageRequest,
    ) -> AppResult<(Vec<Property>, i64)>;

    async fn update_property(&self, id: &str, input: &PropertyInput)
        -> AppResult<Option<Property>>;

    async fn update_property_status(
        &self,
        id: &str,
        status: PropertyStatus,
    ) -> AppResult<Option<Property>>;

    async fn delete_property(&self, id: &str) -> AppResult<bool>;
}

/// Broker profiles and their verification workflow
#[async_trait]
pub trait BrokerBackend: Backend {
    /// Insert a pending profile. One profile per user, license numbers unique.
    async fn create_broker_profile(
        &self,
        user_id: &str,
        input: &BrokerProfileInput,
    ) -> AppResult<BrokerProfile>;

    async fn find_broker_profile_by_id(&self, id: &str) -> AppResult<Option<BrokerProfile>>;

    async fn find_broker_profile_by_user(&self, user_id: &str)
        -> AppResult<Option<BrokerProfile>>;

    async fn find_broker_profiles(
        &self,
        status: Option<VerificationStatus>,
        page: &PageRequest,
    ) -> AppResult<(Vec<BrokerProfile>, i64)>;

    /// Replace the editable fields; verification state is left alone
    async fn update_broker_profile(
        &self,
        user_id: &str,
        input: &BrokerProfileInput,
    ) -> AppResult<Option<BrokerProfile>>;

    /// Move a pending profile to `status`. Returns `None` when the profile is
    /// not pending anymore (or does not exist).
    async fn review_broker_profile(
        &self,
        id: &str,
        status: VerificationStatus,
        reason: Option<&str>,
        reviewer_id: &str,
    ) -> AppResult<Option<BrokerProfile>>;
}

/// Contact form inquiries
#[async_trait]
pub trait ContactBackend: Backend {
    async fn create_contact(&self, contact: &NewContact) -> AppResult<ContactMessage>;

    async fn find_contact_by_id(&self, id: &str) -> AppResult<Option<ContactMessage>>;

    async fn find_contacts(
        &self,
        status: Option<ContactStatus>,
        page: &PageRequest,
    ) -> AppResult<(Vec<ContactMessage>, i64)>;

    /// Flip `new` to `read`; any other status is left as is
    async fn mark_contact_read(&self, id: &str) -> AppResult<Option<ContactMessage>>;

    async fn reply_to_contact(
        &self,
        id: &str,
        reply: &str,
        replied_by: &str,
    ) -> AppResult<Option<ContactMessage>>;

    async fn update_contact_status(
        &self,
        id: &str,
        status: ContactStatus,
    ) -> AppResult<Option<ContactMessage>>;
}

/// Direct user-to-user messages
#[async_trait]
pub trait MessageBackend: Backend {
    async fn create_message(&self, sender_id: &str, input: &MessageInput) -> AppResult<Message>;

    async fn find_message_by_id(&self, id: &str) -> AppResult<Option<Message>>;

    async fn find_inbox(
        &self,
        recipient_id: &str,
        page: &PageRequest,
    ) -> AppResult<(Vec<Message>, i64)>;

    async fn find_sent(&self, sender_id: &str, page: &PageRequest)
        -> AppResult<(Vec<Message>, i64)>;

    async fn mark_message_read(&self, id: &str) -> AppResult<Option<Message>>;
}

/// Everything the HTTP layer needs from storage
pub trait MarketplaceBackend:
    UserBackend + PropertyBackend + BrokerBackend + ContactBackend + MessageBackend
{
}

/// Automatic implementation for any type that implements all store traits
impl<T> MarketplaceBackend for T where
    T: UserBackend + PropertyBackend + BrokerBackend + ContactBackend + MessageBackend
{
}

/// Factory for creating backend instances
pub struct BackendFactory;

impl BackendFactory {
    /// Connect, create the schema, and hand back a shareable backend
    pub async fn create(
        config: &crate::backend::database::DatabaseBackendConfig,
    ) -> AppResult<Arc<dyn MarketplaceBackend>> {
        let backend = Self::create_backend(config).await?;
        backend.init_schema().await?;
        Ok(Arc::from(backend))
    }

    pub async fn create_backend(
        config: &crate::backend::database::DatabaseBackendConfig,
    ) -> AppResult<Box<dyn MarketplaceBackend>> {
        match config.database_type {
            DatabaseType::PostgreSQL => {
                let backend =
                    crate::backend::database::postgres::PostgresBackend::connect(config).await?;
                Ok(Box::new(backend))
            }
            DatabaseType::SQLite => {
                let backend =
                    crate::backend::database::sqlite::SqliteBackend::connect(config).await?;
                Ok(Box::new(backend))
            }
        }
    }
}
