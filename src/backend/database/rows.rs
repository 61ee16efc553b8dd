//! Row shapes as stored, shared by both dialects
//!
//! Enums are stored as their text form and lists as JSON text, so every column
//! decodes with the same Rust type on SQLite and PostgreSQL.

use chrono::{DateTime, Utc};
use std::str::FromStr;

use crate::error::{AppError, AppResult};
use crate::models::{BrokerProfile, ContactMessage, Message, Property, User};

pub const USER_COLUMNS: &str =
    "id, name, email, phone, password_hash, role, is_verified, is_active, created_at, updated_at";

pub const PROPERTY_COLUMNS: &str = "id, owner_id, title, description, property_type, listing_type, price, address, city, state, zipcode, bedrooms, bathrooms, area, year_built, property_condition, features, images, status, views, created_at, updated_at";

pub const BROKER_COLUMNS: &str = "id, user_id, company, license_number, experience_years, serving_areas, specializations, verification_status, rejection_reason, reviewed_by, reviewed_at, created_at, updated_at";

pub const CONTACT_COLUMNS: &str = "id, user_id, name, email, phone, subject, message, property_id, status, reply, replied_at, replied_by, created_at, updated_at";

pub const MESSAGE_COLUMNS: &str =
    "id, sender_id, recipient_id, property_id, body, is_read, created_at";

#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub role: String,
    pub is_verified: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> AppResult<Self> {
        Ok(User {
            role: stored_enum("users.role", &row.role)?,
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            password_hash: row.password_hash,
            is_verified: row.is_verified,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct PropertyRow {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub property_type: String,
    pub listing_type: String,
    pub price: f64,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area: f64,
    pub year_built: Option<i32>,
    pub property_condition: String,
    pub features: String,
    pub images: String,
    pub status: String,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PropertyRow> for Property {
    type Error = AppError;

    fn try_from(row: PropertyRow) -> AppResult<Self> {
        Ok(Property {
            property_type: stored_enum("properties.property_type", &row.property_type)?,
            listing_type: stored_enum("properties.listing_type", &row.listing_type)?,
            condition: stored_enum("properties.property_condition", &row.property_condition)?,
            status: stored_enum("properties.status", &row.status)?,
            features: decode_list(&row.features)?,
            images: decode_list(&row.images)?,
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            price: row.price,
            address: row.address,
            city: row.city,
            state: row.state,
            zipcode: row.zipcode,
            bedrooms: row.bedrooms,
            bathrooms: row.bathrooms,
            area: row.area,
            year_built: row.year_built,
            views: row.views,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct BrokerRow {
    pub id: String,
    pub user_id: String,
    pub company: String,
    pub license_number: String,
    pub experience_years: i32,
    pub serving_areas: String,
    pub specializations: String,
    pub verification_status: String,
    pub rejection_reason: Option<String>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<BrokerRow> for BrokerProfile {
    type Error = AppError;

    fn try_from(row: BrokerRow) -> AppResult<Self> {
        Ok(BrokerProfile {
            verification_status: stored_enum(
                "broker_profiles.verification_status",
                &row.verification_status,
            )?,
            serving_areas: decode_list(&row.serving_areas)?,
            specializations: decode_list(&row.specializations)?,
            id: row.id,
            user_id: row.user_id,
            company: row.company,
            license_number: row.license_number,
            experience_years: row.experience_years,
            rejection_reason: row.rejection_reason,
            reviewed_by: row.reviewed_by,
            reviewed_at: row.reviewed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct ContactRow {
    pub id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub property_id: Option<String>,
    pub status: String,
    pub reply: Option<String>,
    pub replied_at: Option<DateTime<Utc>>,
    pub replied_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ContactRow> for ContactMessage {
    type Error = AppError;

    fn try_from(row: ContactRow) -> AppResult<Self> {
        Ok(ContactMessage {
            status: stored_enum("contact_messages.status", &row.status)?,
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            subject: row.subject,
            message: row.message,
            property_id: row.property_id,
            reply: row.reply,
            replied_at: row.replied_at,
            replied_by: row.replied_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct MessageRow {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub property_id: Option<String>,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            sender_id: row.sender_id,
            recipient_id: row.recipient_id,
            property_id: row.property_id,
            body: row.body,
            is_read: row.is_read,
            created_at: row.created_at,
        }
    }
}

/// Convert a batch of rows, failing on the first undecodable one
pub fn convert_rows<R, T>(rows: Vec<R>) -> AppResult<Vec<T>>
where
    T: TryFrom<R, Error = AppError>,
{
    rows.into_iter().map(T::try_from).collect()
}

fn stored_enum<T>(column: &str, value: &str) -> AppResult<T>
where
    T: FromStr<Err = AppError>,
{
    T::from_str(value)
        .map_err(|_| AppError::Database(format!("Unexpected value '{}' in {}", value, column)))
}

pub fn encode_list(values: &[String]) -> AppResult<String> {
    serde_json::to_string(values).map_err(AppError::Serialization)
}

pub fn decode_list(text: &str) -> AppResult<Vec<String>> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(text).map_err(AppError::Serialization)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PropertyCondition, Role};

    fn property_row() -> PropertyRow {
        let now = Utc::now();
        PropertyRow {
            id: "p1".into(),
            owner_id: "u1".into(),
            title: "Lake house".into(),
            description: "Quiet".into(),
            property_type: "house".into(),
            listing_type: "rent".into(),
            price: 1500.0,
            address: "2 Lake Rd".into(),
            city: "Nainital".into(),
            state: "UK".into(),
            zipcode: "263001".into(),
            bedrooms: 2,
            bathrooms: 1,
            area: 900.0,
            year_built: Some(2001),
            property_condition: "needs_renovation".into(),
            features: r#"["garden","parking"]"#.into(),
            images: "[]".into(),
            status: "available".into(),
            views: 4,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_property_row_conversion() {
        let property = Property::try_from(property_row()).unwrap();
        assert_eq!(property.condition, PropertyCondition::NeedsRenovation);
        assert_eq!(property.features, vec!["garden", "parking"]);
        assert!(property.images.is_empty());
        assert_eq!(property.views, 4);
    }

    #[test]
    fn test_unknown_stored_enum_is_database_error() {
        let mut row = property_row();
        row.status = "archived".into();
        assert!(matches!(
            Property::try_from(row),
            Err(AppError::Database(_))
        ));
    }

    #[test]
    fn test_user_row_conversion() {
        let now = Utc::now();
        let row = UserRow {
            id: "u1".into(),
            name: "Meera".into(),
            email: "meera@example.com".into(),
            phone: "+919812345678".into(),
            password_hash: "$argon2id$...".into(),
            role: "broker".into(),
            is_verified: true,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let user = User::try_from(row).unwrap();
        assert_eq!(user.role, Role::Broker);
    }

    #[test]
    fn test_list_encoding() {
        let encoded = encode_list(&["pool".to_string(), "gym".to_string()]).unwrap();
        assert_eq!(encoded, r#"["pool","gym"]"#);
        assert_eq!(decode_list(&encoded).unwrap(), vec!["pool", "gym"]);
        assert!(decode_list("").unwrap().is_empty());
    }
}
