use chrono::{Datelike, Utc};
use email_address::EmailAddress;
use lazy_static::lazy_static;
use regex::Regex;
use std::str::FromStr;

use crate::error::{AppError, AppResult};
use crate::models::{
    BrokerProfileInput, ContactInput, MessageInput, PropertyInput, RegisterRequest,
};

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 128;

lazy_static! {
    /// Country code is mandatory: `+` followed by 7 to 15 digits
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+[1-9][0-9]{6,14}$").unwrap();
}

/// Trim and lower-case an email address for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Strip spaces, dashes and parentheses that users commonly type
pub fn normalize_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect()
}

pub fn validate_email(email: &str) -> AppResult<()> {
    if email.is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }
    if EmailAddress::from_str(email).is_err() {
        return Err(AppError::Validation(format!(
            "'{}' is not a valid email address",
            email
        )));
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> AppResult<()> {
    if phone.is_empty() {
        return Err(AppError::Validation("Phone number is required".to_string()));
    }
    if !PHONE_REGEX.is_match(phone) {
        return Err(AppError::Validation(
            "Phone number must include the country code, e.g. +919876543210".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> AppResult<()> {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "Password must be no more than {} characters long",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Require a non-blank value no longer than `max` characters
pub fn validate_text(field: &str, value: &str, max: usize) -> AppResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    if trimmed.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

fn validate_non_negative(field: &str, value: f64) -> AppResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::Validation(format!(
            "{} must be a non-negative number",
            field
        )));
    }
    Ok(())
}

/// Validate and normalize a registration request in place
pub fn validate_registration(request: &mut RegisterRequest) -> AppResult<()> {
    request.name = request.name.trim().to_string();
    request.email = normalize_email(&request.email);
    request.phone = normalize_phone(request.phone.trim());

    validate_text("Name", &request.name, 100)?;
    validate_email(&request.email)?;
    validate_phone(&request.phone)?;
    validate_password(&request.password)?;
    Ok(())
}

pub fn validate_property(input: &mut PropertyInput) -> AppResult<()> {
    input.title = input.title.trim().to_string();
    input.city = input.city.trim().to_string();
    input.state = input.state.trim().to_string();
    input.address = input.address.trim().to_string();
    input.zipcode = input.zipcode.trim().to_string();

    validate_text("Title", &input.title, 200)?;
    validate_text("Description", &input.description, 5000)?;
    validate_text("Address", &input.address, 500)?;
    validate_text("City", &input.city, 100)?;
    validate_text("State", &input.state, 100)?;
    validate_non_negative("Price", input.price)?;
    validate_non_negative("Area", input.area)?;

    if input.bedrooms < 0 || input.bathrooms < 0 {
        return Err(AppError::Validation(
            "Bedrooms and bathrooms cannot be negative".to_string(),
        ));
    }

    if let Some(year) = input.year_built {
        let latest = Utc::now().year() + 5;
        if !(1800..=latest).contains(&year) {
            return Err(AppError::Validation(format!(
                "Year built must be between 1800 and {}",
                latest
            )));
        }
    }

    input.features.retain(|f| !f.trim().is_empty());
    input.images.retain(|i| !i.trim().is_empty());
    Ok(())
}

pub fn validate_broker_profile(input: &mut BrokerProfileInput) -> AppResult<()> {
    input.company = input.company.trim().to_string();
    input.license_number = input.license_number.trim().to_string();

    validate_text("Company", &input.company, 200)?;
    validate_text("License number", &input.license_number, 100)?;
    if input.experience_years < 0 || input.experience_years > 80 {
        return Err(AppError::Validation(
            "Experience must be between 0 and 80 years".to_string(),
        ));
    }
    input.serving_areas.retain(|a| !a.trim().is_empty());
    input.specializations.retain(|s| !s.trim().is_empty());
    Ok(())
}

pub fn validate_contact(input: &mut ContactInput) -> AppResult<()> {
    input.name = input.name.trim().to_string();
    input.email = normalize_email(&input.email);

    validate_text("Name", &input.name, 100)?;
    validate_email(&input.email)?;
    validate_text("Message", &input.message, 5000)?;

    if let Some(phone) = input.phone.take() {
        let phone = normalize_phone(phone.trim());
        if !phone.is_empty() {
            validate_phone(&phone)?;
            input.phone = Some(phone);
        }
    }
    if let Some(ref subject) = input.subject {
        if subject.chars().count() > 200 {
            return Err(AppError::Validation(
                "Subject must be at most 200 characters".to_string(),
            ));
        }
    }
    Ok(())
}

pub fn validate_message(input: &MessageInput) -> AppResult<()> {
    if input.recipient_id.trim().is_empty() {
        return Err(AppError::Validation("Recipient is required".to_string()));
    }
    validate_text("Message body", &input.body, 5000)
}
