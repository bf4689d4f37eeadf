use sqlx::mysql::MySqlRow;
use sqlx::{FromRow, MySqlPool};
use tracing::debug;

use crate::bind_values;
use crate::utils::db_utils::{Record, SqlValue, rows_to_records};
use crate::utils::pagination::Window;

/// ===============================
/// SQL text + ordered bind list
/// ===============================
///
/// Filter values only ever enter through `bind`/`and`/`and_like_any`, so the
/// placeholder count always matches `values`. The one thing written straight
/// into the text is a [`Window`], which only holds validated integers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlQuery {
    sql: String,
    values: Vec<SqlValue>,
}

impl SqlQuery {
    pub fn new(base: &str) -> Self {
        Self {
            sql: base.trim().to_string(),
            values: Vec::new(),
        }
    }

    /// Appends trusted SQL text (no user input).
    pub fn push(&mut self, fragment: &str) -> &mut Self {
        self.sql.push(' ');
        self.sql.push_str(fragment.trim());
        self
    }

    pub fn bind(&mut self, value: impl Into<SqlValue>) -> &mut Self {
        self.values.push(value.into());
        self
    }

    /// `AND <condition>` with the values for its placeholders.
    pub fn and<I>(&mut self, condition: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = SqlValue>,
    {
        self.push(&format!("AND {}", condition.trim()));
        self.values.extend(values);
        self
    }

    /// `AND (c1 LIKE ? OR c2 LIKE ? ...)`, wildcard on both sides of `term`.
    pub fn and_like_any(&mut self, columns: &[&str], term: &str) -> &mut Self {
        if columns.is_empty() {
            return self;
        }
        let pattern = format!("%{term}%");
        let condition = columns
            .iter()
            .map(|c| format!("{c} LIKE ?"))
            .collect::<Vec<_>>()
            .join(" OR ");
        self.and(
            &format!("({condition})"),
            columns.iter().map(|_| SqlValue::String(pattern.clone())),
        )
    }

    pub fn window(&mut self, window: Window) -> &mut Self {
        self.sql.push_str(&window.sql());
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub async fn fetch_records(&self, pool: &MySqlPool) -> Result<Vec<Record>, sqlx::Error> {
        debug!(sql = %self.sql, bindings = ?self.values, "Fetching records");
        let rows = bind_values!(sqlx::query(&self.sql), &self.values)
            .fetch_all(pool)
            .await?;
        rows_to_records(&rows)
    }

    pub async fn fetch_optional_record(
        &self,
        pool: &MySqlPool,
    ) -> Result<Option<Record>, sqlx::Error> {
        Ok(self.fetch_records(pool).await?.into_iter().next())
    }

    pub async fn fetch_all_as<T>(&self, pool: &MySqlPool) -> Result<Vec<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
    {
        debug!(sql = %self.sql, bindings = ?self.values, "Fetching rows");
        bind_values!(sqlx::query_as::<_, T>(&self.sql), &self.values)
            .fetch_all(pool)
            .await
    }

    pub async fn fetch_optional_as<T>(&self, pool: &MySqlPool) -> Result<Option<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
    {
        debug!(sql = %self.sql, bindings = ?self.values, "Fetching row");
        bind_values!(sqlx::query_as::<_, T>(&self.sql), &self.values)
            .fetch_optional(pool)
            .await
    }

    /// For `SELECT COUNT(*) ...` queries.
    pub async fn fetch_count(&self, pool: &MySqlPool) -> Result<i64, sqlx::Error> {
        debug!(sql = %self.sql, bindings = ?self.values, "Counting rows");
        bind_values!(sqlx::query_scalar::<_, i64>(&self.sql), &self.values)
            .fetch_one(pool)
            .await
    }
}

#[cfg(test)]
pub(crate) fn placeholders(sql: &str) -> usize {
    sql.matches('?').count()
}
