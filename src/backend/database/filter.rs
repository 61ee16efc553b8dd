use crate::models::PropertyStatus;
use crate::parser::ListingFilter;

/// A value bound to a positional placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    Integer(i64),
    Real(f64),
}

/// Columns the listing query may constrain. Column names in generated SQL
/// only ever come from here. `City` targets the stored lower-case copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingColumn {
    Status,
    PropertyType,
    ListingType,
    City,
    Condition,
    Bedrooms,
    Bathrooms,
    Price,
    Area,
}

impl ListingColumn {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ListingColumn::Status => "status",
            ListingColumn::PropertyType => "property_type",
            ListingColumn::ListingType => "listing_type",
            ListingColumn::City => "city_folded",
            ListingColumn::Condition => "property_condition",
            ListingColumn::Bedrooms => "bedrooms",
            ListingColumn::Bathrooms => "bathrooms",
            ListingColumn::Price => "price",
            ListingColumn::Area => "area",
        }
    }
}

/// Newest first, with the id as tie breaker so pages never overlap
pub const LISTING_ORDER_BY: &str = "ORDER BY created_at DESC, id DESC";

/// WHERE condition (without the keyword) plus the values for its placeholders,
/// in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl WhereClause {
    /// Placeholder index the next appended parameter would get
    pub fn next_index(&self) -> usize {
        self.params.len() + 1
    }
}

/// Accumulates AND-ed conditions, numbering placeholders as values are added
pub struct WhereBuilder<'a> {
    converter: &'a dyn FilterConverter,
    conditions: Vec<String>,
    params: Vec<BindValue>,
}

impl<'a> WhereBuilder<'a> {
    pub fn new(converter: &'a dyn FilterConverter) -> Self {
        Self {
            converter,
            conditions: Vec::new(),
            params: Vec::new(),
        }
    }

    fn bind(&mut self, value: BindValue) -> String {
        self.params.push(value);
        self.converter.placeholder(self.params.len())
    }

    pub fn eq(&mut self, column: ListingColumn, value: BindValue) -> &mut Self {
        let placeholder = self.bind(value);
        self.conditions
            .push(format!("{} = {}", column.as_sql(), placeholder));
        self
    }

    pub fn at_least(&mut self, column: ListingColumn, value: BindValue) -> &mut Self {
        let placeholder = self.bind(value);
        self.conditions
            .push(format!("{} >= {}", column.as_sql(), placeholder));
        self
    }

    pub fn at_most(&mut self, column: ListingColumn, value: BindValue) -> &mut Self {
        let placeholder = self.bind(value);
        self.conditions
            .push(format!("{} <= {}", column.as_sql(), placeholder));
        self
    }

    /// Substring match of a folded column against the folded `needle`
    pub fn contains_insensitive(&mut self, column: ListingColumn, needle: &str) -> &mut Self {
        let placeholder = self.bind(BindValue::Text(like_pattern(&fold_case(needle))));
        let condition = self.converter.like_escaped(column.as_sql(), &placeholder);
        self.conditions.push(condition);
        self
    }

    pub fn build(self) -> WhereClause {
        WhereClause {
            sql: self.conditions.join(" AND "),
            params: self.params,
        }
    }
}

/// Unicode lower-casing applied to stored city names and to the city filter,
/// so matching does not depend on the database's collation
pub fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

/// Wrap `needle` in `%…%`, escaping LIKE metacharacters with `\`
pub fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Dialect hooks for turning a [`ListingFilter`] into SQL
///
/// Backends provide placeholder syntax; the predicate order and the bound
/// values are shared.
pub trait FilterConverter: Send + Sync {
    /// Placeholder for the 1-based parameter `index`
    /// - PostgreSQL: $1, $2, $3...
    /// - SQLite: ?1, ?2, ?3...
    fn placeholder(&self, index: usize) -> String;

    /// `LIKE` of `column` against a pattern escaped by [`like_pattern`]
    fn like_escaped(&self, column: &str, placeholder: &str) -> String {
        format!("{} LIKE {} ESCAPE '\\'", column, placeholder)
    }

    /// Build the listing predicate. `status = 'available'` always comes first.
    fn to_where_clause(&self, filter: &ListingFilter) -> WhereClause
    where
        Self: Sized,
    {
        let mut builder = WhereBuilder::new(self);

        builder.eq(
            ListingColumn::Status,
            BindValue::Text(PropertyStatus::Available.as_str().to_string()),
        );

        if let Some(property_type) = filter.property_type {
            builder.eq(
                ListingColumn::PropertyType,
                BindValue::Text(property_type.as_str().to_string()),
            );
        }
        if let Some(listing_type) = filter.listing_type {
            builder.eq(
                ListingColumn::ListingType,
                BindValue::Text(listing_type.as_str().to_string()),
            );
        }
        if let Some(city) = &filter.city {
            builder.contains_insensitive(ListingColumn::City, city);
        }
        if let Some(condition) = filter.condition {
            builder.eq(
                ListingColumn::Condition,
                BindValue::Text(condition.as_str().to_string()),
            );
        }
        if let Some(bedrooms) = filter.min_bedrooms {
            builder.at_least(ListingColumn::Bedrooms, BindValue::Integer(bedrooms));
        }
        if let Some(bathrooms) = filter.min_bathrooms {
            builder.at_least(ListingColumn::Bathrooms, BindValue::Integer(bathrooms));
        }
        if let Some(min_price) = filter.min_price {
            builder.at_least(ListingColumn::Price, BindValue::Real(min_price));
        }
        if let Some(max_price) = filter.max_price {
            builder.at_most(ListingColumn::Price, BindValue::Real(max_price));
        }
        if let Some(min_area) = filter.min_area {
            builder.at_least(ListingColumn::Area, BindValue::Real(min_area));
        }
        if let Some(max_area) = filter.max_area {
            builder.at_most(ListingColumn::Area, BindValue::Real(max_area));
        }

        builder.build()
    }
}
