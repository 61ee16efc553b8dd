use super::super::filter::FilterConverter;

/// SQLite placeholders are numbered `?N`.
pub struct SqliteFilterConverter;

impl SqliteFilterConverter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SqliteFilterConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterConverter for SqliteFilterConverter {
    fn placeholder(&self, index: usize) -> String {
        format!("?{}", index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::database::filter::BindValue;
    use crate::models::{ListingType, PropertyCondition};
    use crate::parser::ListingFilter;

    #[test]
    fn test_sqlite_listing_clause() {
        let filter = ListingFilter {
            listing_type: Some(ListingType::Rent),
            city: Some("Bengaluru".to_string()),
            condition: Some(PropertyCondition::New),
            min_bedrooms: Some(2),
            max_area: Some(1500.0),
            ..Default::default()
        };

        let clause = SqliteFilterConverter::new().to_where_clause(&filter);

        assert_eq!(
            clause.sql,
            "status = ?1 AND listing_type = ?2 AND city_folded LIKE ?3 ESCAPE '\\' \
             AND property_condition = ?4 AND bedrooms >= ?5 AND area <= ?6"
        );
        assert_eq!(clause.params[2], BindValue::Text("%bengaluru%".to_string()));
        assert_eq!(clause.params[4], BindValue::Integer(2));
        assert_eq!(clause.next_index(), 7);
    }
}
