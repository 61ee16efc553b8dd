use std::collections::HashMap;

use crate::error::{AppError, AppResult};

/// 1-based page number and page size shared by every list endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Self {
        PageRequest { page, limit }
    }

    /// Rows to skip before the requested page
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Read `page` and `limit` from query parameters. Empty values count as
    /// absent, anything else must be a positive integer.
    pub fn from_params(
        params: &HashMap<String, String>,
        default_size: i64,
        max_size: i64,
    ) -> AppResult<Self> {
        let page = match non_empty(params, "page") {
            Some(raw) => parse_positive("page", raw)?,
            None => 1,
        };

        let limit = match non_empty(params, "limit") {
            Some(raw) => parse_positive("limit", raw)?,
            None => default_size,
        };

        if limit > max_size {
            return Err(AppError::Validation(format!(
                "limit must be at most {}",
                max_size
            )));
        }

        Ok(PageRequest { page, limit })
    }
}

pub(crate) fn non_empty<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn parse_positive(name: &str, raw: &str) -> AppResult<i64> {
    match raw.parse::<i64>() {
        Ok(value) if value >= 1 => Ok(value),
        _ => Err(AppError::Validation(format!(
            "{} must be a positive integer, got '{}'",
            name, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let request = PageRequest::from_params(&params(&[]), 12, 100).unwrap();
        assert_eq!(request, PageRequest::new(1, 12));
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn test_explicit_values() {
        let request =
            PageRequest::from_params(&params(&[("page", "3"), ("limit", "20")]), 12, 100).unwrap();
        assert_eq!(request.page, 3);
        assert_eq!(request.limit, 20);
        assert_eq!(request.offset(), 40);
    }

    #[test]
    fn test_empty_values_are_absent() {
        let request =
            PageRequest::from_params(&params(&[("page", ""), ("limit", " ")]), 12, 100).unwrap();
        assert_eq!(request, PageRequest::new(1, 12));
    }

    #[test]
    fn test_rejects_bad_values() {
        for (key, value) in [("page", "0"), ("page", "-1"), ("page", "two"), ("limit", "1.5")] {
            let result = PageRequest::from_params(&params(&[(key, value)]), 12, 100);
            assert!(
                matches!(result, Err(AppError::Validation(_))),
                "{}={} should be rejected",
                key,
                value
            );
        }
    }

    #[test]
    fn test_limit_above_maximum() {
        let result = PageRequest::from_params(&params(&[("limit", "101")]), 12, 100);
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(PageRequest::from_params(&params(&[("limit", "100")]), 12, 100).is_ok());
    }
}
