use std::collections::HashMap;
use std::str::FromStr;

use super::pagination::{non_empty, PageRequest};
use crate::error::{AppError, AppResult};
use crate::models::{ListingType, PropertyCondition, PropertyType};

/// Every query parameter the public listing endpoint understands
pub const LISTING_PARAMS: &[&str] = &[
    "propertyType",
    "listingType",
    "city",
    "condition",
    "bedrooms",
    "bathrooms",
    "minPrice",
    "maxPrice",
    "minArea",
    "maxArea",
    "page",
    "limit",
];

/// Typed listing filters. Absent fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    pub property_type: Option<PropertyType>,
    pub listing_type: Option<ListingType>,
    /// Case-insensitive substring of the city name
    pub city: Option<String>,
    pub condition: Option<PropertyCondition>,
    pub min_bedrooms: Option<i64>,
    pub min_bathrooms: Option<i64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_area: Option<f64>,
    pub max_area: Option<f64>,
}

impl ListingFilter {
    pub fn is_empty(&self) -> bool {
        *self == ListingFilter::default()
    }
}

/// A parsed listing request: filters plus the requested page
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    pub filter: ListingFilter,
    pub page: PageRequest,
}

impl ListingQuery {
    pub fn from_params(
        params: &HashMap<String, String>,
        default_size: i64,
        max_size: i64,
    ) -> AppResult<Self> {
        let mut unknown: Vec<&str> = params
            .keys()
            .map(String::as_str)
            .filter(|key| !LISTING_PARAMS.contains(key))
            .collect();
        if !unknown.is_empty() {
            unknown.sort_unstable();
            return Err(AppError::Validation(format!(
                "Unknown query parameter(s): {}",
                unknown.join(", ")
            )));
        }

        let filter = ListingFilter {
            property_type: parse_enum(params, "propertyType")?,
            listing_type: parse_enum(params, "listingType")?,
            city: non_empty(params, "city").map(str::to_string),
            condition: parse_enum(params, "condition")?,
            min_bedrooms: parse_count(params, "bedrooms")?,
            min_bathrooms: parse_count(params, "bathrooms")?,
            min_price: parse_amount(params, "minPrice")?,
            max_price: parse_amount(params, "maxPrice")?,
            min_area: parse_amount(params, "minArea")?,
            max_area: parse_amount(params, "maxArea")?,
        };

        check_range("price", filter.min_price, filter.max_price)?;
        check_range("area", filter.min_area, filter.max_area)?;

        let page = PageRequest::from_params(params, default_size, max_size)?;

        Ok(ListingQuery { filter, page })
    }
}

fn parse_enum<T>(params: &HashMap<String, String>, key: &str) -> AppResult<Option<T>>
where
    T: FromStr<Err = AppError>,
{
    non_empty(params, key).map(T::from_str).transpose()
}

fn parse_count(params: &HashMap<String, String>, key: &str) -> AppResult<Option<i64>> {
    let Some(raw) = non_empty(params, key) else {
        return Ok(None);
    };
    match raw.parse::<i64>() {
        Ok(value) if value >= 0 => Ok(Some(value)),
        _ => Err(AppError::Validation(format!(
            "{} must be a non-negative integer, got '{}'",
            key, raw
        ))),
    }
}

fn parse_amount(params: &HashMap<String, String>, key: &str) -> AppResult<Option<f64>> {
    let Some(raw) = non_empty(params, key) else {
        return Ok(None);
    };
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(Some(value)),
        _ => Err(AppError::Validation(format!(
            "{} must be a non-negative number, got '{}'",
            key, raw
        ))),
    }
}

fn check_range(quantity: &str, min: Option<f64>, max: Option<f64>) -> AppResult<()> {
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(AppError::Validation(format!(
                "Minimum {} cannot be greater than maximum {}",
                quantity, quantity
            )));
        }
    }
    Ok(())
}
