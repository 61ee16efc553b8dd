use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Declares a closed string-backed enum stored as TEXT and exchanged as JSON
/// strings. Parsing rejects anything outside the listed values.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(AppError::Validation(format!(
                        "Invalid {} '{}', expected one of: {}",
                        stringify!($name),
                        other,
                        [$($text),+].join(", ")
                    ))),
                }
            }
        }
    };
}

string_enum!(
    /// Account role. Only customer and broker can be self-registered.
    Role {
        Customer => "customer",
        Broker => "broker",
        Admin => "admin",
    }
);

string_enum!(PropertyType {
    Apartment => "apartment",
    Villa => "villa",
    House => "house",
    Flat => "flat",
    Commercial => "commercial",
    Plot => "plot",
    Office => "office",
});

string_enum!(ListingType {
    Sale => "sale",
    Rent => "rent",
});

string_enum!(PropertyCondition {
    New => "new",
    Excellent => "excellent",
    Good => "good",
    Fair => "fair",
    NeedsRenovation => "needs_renovation",
});

string_enum!(PropertyStatus {
    Available => "available",
    Pending => "pending",
    Sold => "sold",
    Rented => "rented",
});

string_enum!(VerificationStatus {
    Pending => "pending",
    Verified => "verified",
    Rejected => "rejected",
});

string_enum!(ContactStatus {
    New => "new",
    Read => "read",
    Replied => "replied",
    Closed => "closed",
});

impl Default for Role {
    fn default() -> Self {
        Role::Customer
    }
}

impl VerificationStatus {
    /// Only a pending profile can be reviewed, and a review always ends it.
    pub fn can_transition_to(&self, next: VerificationStatus) -> bool {
        matches!(
            (self, next),
            (VerificationStatus::Pending, VerificationStatus::Verified)
                | (VerificationStatus::Pending, VerificationStatus::Rejected)
        )
    }
}

/// Stored user record. Carries the password hash, so it is never serialized
/// directly; handlers return [`PublicUser`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub role: Role,
    pub is_verified: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub is_verified: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        PublicUser {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            role: user.role,
            is_verified: user.is_verified,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Validated, normalized user ready for insertion
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Result of a successful register or login
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub listing_type: ListingType,
    pub price: f64,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area: f64,
    pub year_built: Option<i32>,
    pub condition: PropertyCondition,
    pub features: Vec<String>,
    pub images: Vec<String>,
    pub status: PropertyStatus,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Property payload accepted on create. Also used, field by field, as the
/// merge target for partial updates.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PropertyInput {
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub listing_type: ListingType,
    pub price: f64,
    pub address: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub zipcode: String,
    #[serde(default)]
    pub bedrooms: i32,
    #[serde(default)]
    pub bathrooms: i32,
    #[serde(default)]
    pub area: f64,
    pub year_built: Option<i32>,
    #[serde(default = "default_condition")]
    pub condition: PropertyCondition,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

fn default_condition() -> PropertyCondition {
    PropertyCondition::Good
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PropertyUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub property_type: Option<PropertyType>,
    pub listing_type: Option<ListingType>,
    pub price: Option<f64>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area: Option<f64>,
    pub year_built: Option<i32>,
    pub condition: Option<PropertyCondition>,
    pub features: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
}

impl PropertyInput {
    pub fn from_property(property: &Property) -> Self {
        PropertyInput {
            title: property.title.clone(),
            description: property.description.clone(),
            property_type: property.property_type,
            listing_type: property.listing_type,
            price: property.price,
            address: property.address.clone(),
            city: property.city.clone(),
            state: property.state.clone(),
            zipcode: property.zipcode.clone(),
            bedrooms: property.bedrooms,
            bathrooms: property.bathrooms,
            area: property.area,
            year_built: property.year_built,
            condition: property.condition,
            features: property.features.clone(),
            images: property.images.clone(),
        }
    }

    pub fn apply(mut self, update: PropertyUpdate) -> Self {
        if let Some(v) = update.title {
            self.title = v;
        }
        if let Some(v) = update.description {
            self.description = v;
        }
        if let Some(v) = update.property_type {
            self.property_type = v;
        }
        if let Some(v) = update.listing_type {
            self.listing_type = v;
        }
        if let Some(v) = update.price {
            self.price = v;
        }
        if let Some(v) = update.address {
            self.address = v;
        }
        if let Some(v) = update.city {
            self.city = v;
        }
        if let Some(v) = update.state {
            self.state = v;
        }
        if let Some(v) = update.zipcode {
            self.zipcode = v;
        }
        if let Some(v) = update.bedrooms {
            self.bedrooms = v;
        }
        if let Some(v) = update.bathrooms {
            self.bathrooms = v;
        }
        if let Some(v) = update.area {
            self.area = v;
        }
        if update.year_built.is_some() {
            self.year_built = update.year_built;
        }
        if let Some(v) = update.condition {
            self.condition = v;
        }
        if let Some(v) = update.features {
            self.features = v;
        }
        if let Some(v) = update.images {
            self.images = v;
        }
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusChangeRequest<S> {
    pub status: S,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerProfile {
    pub id: String,
    pub user_id: String,
    pub company: String,
    pub license_number: String,
    pub experience_years: i32,
    pub serving_areas: Vec<String>,
    pub specializations: Vec<String>,
    pub verification_status: VerificationStatus,
    pub rejection_reason: Option<String>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BrokerProfileInput {
    pub company: String,
    pub license_number: String,
    #[serde(default)]
    pub experience_years: i32,
    #[serde(default)]
    pub serving_areas: Vec<String>,
    #[serde(default)]
    pub specializations: Vec<String>,
}

/// Broker profile together with the owning account
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerView {
    #[serde(flatten)]
    pub profile: BrokerProfile,
    pub user: PublicUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrokerReviewRequest {
    pub status: VerificationStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub property_id: Option<String>,
    pub status: ContactStatus,
    pub reply: Option<String>,
    pub replied_at: Option<DateTime<Utc>>,
    pub replied_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContactInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    #[serde(default)]
    pub message: String,
    pub property_id: Option<String>,
}

/// Contact inquiry after validation, with the sender link resolved
#[derive(Debug, Clone)]
pub struct NewContact {
    pub user_id: Option<String>,
    pub input: ContactInput,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactReplyRequest {
    #[serde(default)]
    pub reply: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub property_id: Option<String>,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MessageInput {
    pub recipient_id: String,
    pub property_id: Option<String>,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActiveRequest {
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserVerifiedRequest {
    pub is_verified: bool,
}

/// One page of a paginated listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub current_page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, current_page: i64, page_size: i64) -> Self {
        let total_pages = if page_size > 0 {
            (total + page_size - 1) / page_size
        } else {
            0
        };
        Page {
            items,
            total,
            current_page,
            page_size,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            current_page: self.current_page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_enum_round_trip_text() {
        assert_eq!(PropertyType::from_str("villa").unwrap(), PropertyType::Villa);
        assert_eq!(PropertyCondition::NeedsRenovation.as_str(), "needs_renovation");
        assert!(ListingType::from_str("lease").is_err());
        assert!(Role::from_str("Admin").is_err());
    }

    #[test]
    fn test_enum_serde_matches_storage_text() {
        let json = serde_json::to_string(&PropertyCondition::NeedsRenovation).unwrap();
        assert_eq!(json, "\"needs_renovation\"");
        let status: ContactStatus = serde_json::from_str("\"replied\"").unwrap();
        assert_eq!(status, ContactStatus::Replied);
    }

    #[test]
    fn test_verification_transitions() {
        use VerificationStatus::*;
        assert!(Pending.can_transition_to(Verified));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Verified.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Verified));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn test_page_total_pages() {
        assert_eq!(Page::new(Vec::<i32>::new(), 15, 1, 12).total_pages, 2);
        assert_eq!(Page::new(Vec::<i32>::new(), 24, 1, 12).total_pages, 2);
        assert_eq!(Page::new(Vec::<i32>::new(), 0, 1, 12).total_pages, 0);
        assert_eq!(Page::new(Vec::<i32>::new(), 1, 3, 12).total_pages, 1);
    }

    #[test]
    fn test_public_user_has_no_password() {
        let now = Utc::now();
        let user = User {
            id: "u1".into(),
            name: "Asha".into(),
            email: "asha@example.com".into(),
            phone: "+919876543210".into(),
            password_hash: "$argon2id$secret".into(),
            role: Role::Customer,
            is_verified: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(PublicUser::from(user)).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
        assert!(!json.to_string().contains("argon2"));
        assert_eq!(json["isActive"], true);
    }

    #[test]
    fn test_property_update_merges_only_given_fields() {
        let input: PropertyInput = serde_json::from_value(serde_json::json!({
            "title": "Sea view villa",
            "description": "Four bedrooms",
            "propertyType": "villa",
            "listingType": "sale",
            "price": 2500000.0,
            "address": "1 Beach Rd",
            "city": "Goa",
            "state": "GA"
        }))
        .unwrap();
        let update = PropertyUpdate {
            price: Some(2400000.0),
            ..Default::default()
        };
        let merged = input.apply(update);
        assert_eq!(merged.price, 2400000.0);
        assert_eq!(merged.title, "Sea view villa");
        assert_eq!(merged.condition, PropertyCondition::Good);
    }
}
