use crate::filter::Direction;
use crate::value::SqlValue;

/// A fluent builder for the SELECT/COUNT shapes the service issues.
///
/// Identifiers (table and column names) must come from an entity's static
/// column registry; values are returned separately for driver binding.
///
/// # Example
///
/// ```ignore
/// let (sql, params) = QueryBuilder::new("todo")
///     .where_eq("user_id", 7.into())
///     .order_by("created_at", Direction::Desc)
///     .limit(10)
///     .build_select("id, title");
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: &'static str,
    conditions: Vec<(String, SqlValue)>,
    order: Option<(String, Direction)>,
    limit_val: Option<u64>,
    offset_val: Option<u64>,
}

impl QueryBuilder {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            conditions: Vec::new(),
            order: None,
            limit_val: None,
            offset_val: None,
        }
    }

    /// Add an `column = ?` predicate; predicates are ANDed.
    pub fn where_eq(mut self, column: &str, value: SqlValue) -> Self {
        self.conditions.push((column.to_string(), value));
        self
    }

    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.order = Some((column.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit_val = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset_val = Some(offset);
        self
    }

    /// Build a SELECT query returning `(sql, bind_values)`.
    pub fn build_select(&self, columns: &str) -> (String, Vec<SqlValue>) {
        let mut sql = format!("SELECT {columns} FROM {}", self.table);
        let params = self.append_where(&mut sql);
        self.append_order(&mut sql);
        self.append_limit_offset(&mut sql);
        (sql, params)
    }

    /// Build a SELECT that carries the unpaginated total as a window-count
    /// column (`COUNT(*) OVER ()`) on every returned row.
    pub fn build_select_with_total(
        &self,
        columns: &str,
        total_alias: &str,
    ) -> (String, Vec<SqlValue>) {
        let mut sql = format!(
            "SELECT {columns}, COUNT(*) OVER () AS {total_alias} FROM {}",
            self.table
        );
        let params = self.append_where(&mut sql);
        self.append_order(&mut sql);
        self.append_limit_offset(&mut sql);
        (sql, params)
    }

    /// Build a COUNT over `column` for the filtered query, ignoring any
    /// ordering or pagination bounds.
    pub fn build_count(&self, column: &str) -> (String, Vec<SqlValue>) {
        let mut sql = format!("SELECT COUNT({column}) FROM {}", self.table);
        let params = self.append_where(&mut sql);
        (sql, params)
    }

    fn append_where(&self, sql: &mut String) -> Vec<SqlValue> {
        let mut params = Vec::with_capacity(self.conditions.len());
        for (i, (column, value)) in self.conditions.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            sql.push_str(column);
            sql.push_str(" = ?");
            params.push(value.clone());
        }
        params
    }

    fn append_order(&self, sql: &mut String) {
        if let Some((column, direction)) = &self.order {
            sql.push_str(&format!(" ORDER BY {column} {}", direction.as_sql()));
        }
    }

    fn append_limit_offset(&self, sql: &mut String) {
        // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded.
        match (self.limit_val, self.offset_val) {
            (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
            (None, None) => {}
        }
    }
}
