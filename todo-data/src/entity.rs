use sqlx::sqlite::{Sqlite, SqliteRow};

use crate::value::SqlValue;

/// Trait representing a database entity with a table name, id column, and
/// column list.
///
/// `columns()` doubles as the field registry for runtime filter and ordering
/// keys: a name absent from the list is skipped with a warning instead of
/// reaching the database.
///
/// # Example
///
/// ```ignore
/// impl Entity for Todo {
///     type Id = i64;
///     fn table_name() -> &'static str { "todo" }
///     fn columns() -> &'static [&'static str] {
///         &["id", "title", "is_completed", "user_id", "created_at", "updated_at"]
///     }
///     fn generated_columns() -> &'static [&'static str] { &["created_at", "updated_at"] }
///     fn id(&self) -> Option<i64> { self.id }
///     fn set_id(&mut self, id: i64) { self.id = Some(id); }
///     fn values(&self) -> Vec<SqlValue> {
///         vec![
///             self.title.as_str().into(),
///             self.is_completed.into(),
///             self.user_id.into(),
///         ]
///     }
/// }
/// ```
pub trait Entity:
    Clone + Send + Sync + Unpin + for<'r> sqlx::FromRow<'r, SqliteRow> + 'static
{
    /// Scalar primary-key type. Never null once the row is persisted.
    type Id: Clone
        + PartialEq
        + std::fmt::Display
        + Into<SqlValue>
        + for<'r> sqlx::Decode<'r, Sqlite>
        + sqlx::Type<Sqlite>
        + Send
        + Sync
        + 'static;

    fn table_name() -> &'static str;

    fn id_column() -> &'static str {
        "id"
    }

    /// All mapped columns, including the id column.
    fn columns() -> &'static [&'static str];

    /// Columns assigned by the store (defaults, triggers). Skipped on writes
    /// and picked up again by refresh.
    fn generated_columns() -> &'static [&'static str] {
        &[]
    }

    /// The identifier, if one has been assigned by the store.
    fn id(&self) -> Option<Self::Id>;

    /// Record the store-assigned identifier after the first insert.
    fn set_id(&mut self, id: Self::Id);

    /// Bind values for the writable columns, aligned with
    /// [`writable_columns`](Entity::writable_columns) order.
    fn values(&self) -> Vec<SqlValue>;

    /// Columns written on insert/update: everything except the id column and
    /// the store-generated ones.
    fn writable_columns() -> Vec<&'static str> {
        Self::columns()
            .iter()
            .copied()
            .filter(|c| *c != Self::id_column() && !Self::generated_columns().contains(c))
            .collect()
    }

    fn has_column(name: &str) -> bool {
        Self::columns().contains(&name)
    }
}
