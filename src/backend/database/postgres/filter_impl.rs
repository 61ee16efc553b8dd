use super::super::filter::FilterConverter;

/// PostgreSQL placeholders are `$N`.
pub struct PostgresFilterConverter;

impl PostgresFilterConverter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PostgresFilterConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterConverter for PostgresFilterConverter {
    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }
}
