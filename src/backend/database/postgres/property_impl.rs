use async_trait::async_trait;

use super::backend_impl::PostgresBackend;
use crate::backend::database::common::{map_database_error, new_id, timestamp};
use crate::backend::database::filter::{fold_case, FilterConverter, LISTING_ORDER_BY};
use crate::backend::database::rows::{convert_rows, encode_list, PropertyRow, PROPERTY_COLUMNS};
use crate::backend::PropertyBackend;
use crate::error::{AppError, AppResult};
use crate::models::{Property, PropertyInput, PropertyStatus};
use crate::parser::{ListingFilter, PageRequest};

#[async_trait]
impl PropertyBackend for PostgresBackend {
    async fn create_property(&self, owner_id: &str, input: &PropertyInput) -> AppResult<Property> {
        let id = new_id();
        let now = timestamp();

        sqlx::query(
            "INSERT INTO properties (id, owner_id, title, description, property_type, listing_type, price, \
             address, city, city_folded, state, zipcode, bedrooms, bathrooms, area, year_built, \
             property_condition, features, images, status, views, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, 0, $21, $22)",
        )
        .bind(&id)
        .bind(owner_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.property_type.as_str())
        .bind(input.listing_type.as_str())
        .bind(input.price)
        .bind(&input.address)
        .bind(&input.city)
        .bind(fold_case(&input.city))
        .bind(&input.state)
        .bind(&input.zipcode)
        .bind(input.bedrooms)
        .bind(input.bathrooms)
        .bind(input.area)
        .bind(input.year_built)
        .bind(input.condition.as_str())
        .bind(encode_list(&input.features)?)
        .bind(encode_list(&input.images)?)
        .bind(PropertyStatus::Available.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_database_error(e, "Property"))?;

        self.find_property_by_id(&id).await?.ok_or_else(|| {
            AppError::Internal("Created property could not be read back".to_string())
        })
    }

    async fn find_property_by_id(&self, id: &str) -> AppResult<Option<Property>> {
        let sql = format!("SELECT {} FROM properties WHERE id = $1", PROPERTY_COLUMNS);

        let row = sqlx::query_as::<_, PropertyRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to find property: {}", e)))?;

        row.map(Property::try_from).transpose()
    }

    async fn record_property_view(&self, id: &str) -> AppResult<Option<Property>> {
        let result = sqlx::query("UPDATE properties SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to record view: {}", e)))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_property_by_id(id).await
    }

    async fn search_properties(
        &self,
        filter: &ListingFilter,
        page: &PageRequest,
    ) -> AppResult<(Vec<Property>, i64)> {
        let clause = self.filter_converter.to_where_clause(filter);

        let count_sql = format!("SELECT COUNT(*) FROM properties WHERE {}", clause.sql);
        let total: i64 = bind_params!(sqlx::query_scalar::<_, i64>(&count_sql), &clause.params)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to count properties: {}", e)))?;

        let limit_index = clause.next_index();
        let sql = format!(
            "SELECT {} FROM properties WHERE {} {} LIMIT {} OFFSET {}",
            PROPERTY_COLUMNS,
            clause.sql,
            LISTING_ORDER_BY,
            self.filter_converter.placeholder(limit_index),
            self.filter_converter.placeholder(limit_index + 1)
        );
        let rows = bind_params!(sqlx::query_as::<_, PropertyRow>(&sql), &clause.params)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to search properties: {}", e)))?;

        Ok((convert_rows(rows)?, total))
    }

    async fn find_properties_by_owner(
        &self,
        owner_id: &str,
        page: &PageRequest,
    ) -> AppResult<(Vec<Property>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM properties WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to count properties: {}", e)))?;

        let sql = format!(
            "SELECT {} FROM properties WHERE owner_id = $1 {} LIMIT $2 OFFSET $3",
            PROPERTY_COLUMNS, LISTING_ORDER_BY
        );
        let rows = sqlx::query_as::<_, PropertyRow>(&sql)
            .bind(owner_id)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to list properties: {}", e)))?;

        Ok((convert_rows(rows)?, total))
    }

    async fn update_property(
        &self,
        id: &str,
        input: &PropertyInput,
    ) -> AppResult<Option<Property>> {
        let result = sqlx::query(
            "UPDATE properties SET title = $1, description = $2, property_type = $3, listing_type = $4, \
             price = $5, address = $6, city = $7, city_folded = $8, state = $9, zipcode = $10, \
             bedrooms = $11, bathrooms = $12, area = $13, year_built = $14, property_condition = $15, \
             features = $16, images = $17, updated_at = $18 WHERE id = $19",
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.property_type.as_str())
        .bind(input.listing_type.as_str())
        .bind(input.price)
        .bind(&input.address)
        .bind(&input.city)
        .bind(fold_case(&input.city))
        .bind(&input.state)
        .bind(&input.zipcode)
        .bind(input.bedrooms)
        .bind(input.bathrooms)
        .bind(input.area)
        .bind(input.year_built)
        .bind(input.condition.as_str())
        .bind(encode_list(&input.features)?)
        .bind(encode_list(&input.images)?)
        .bind(timestamp())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_database_error(e, "Property"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_property_by_id(id).await
    }

    async fn update_property_status(
        &self,
        id: &str,
        status: PropertyStatus,
    ) -> AppResult<Option<Property>> {
        let result =
            sqlx::query("UPDATE properties SET status = $1, updated_at = $2 WHERE id = $3")
                .bind(status.as_str())
                .bind(timestamp())
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| map_database_error(e, "Property"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_property_by_id(id).await
    }

    async fn delete_property(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete property: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}
