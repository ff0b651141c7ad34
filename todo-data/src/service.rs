use std::marker::PhantomData;

use sqlx::Row;

use crate::entity::Entity;
use crate::error::{DataError, DataResult, SqlxErrorExt};
use crate::filter::Criteria;
use crate::query::QueryBuilder;
use crate::session::Session;
use crate::value::SqlValue;

const TOTAL_COUNT_ALIAS: &str = "total_count";

/// Per-call overrides for the session-lifecycle flags.
///
/// `None` defers to the value the service was constructed with.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    pub auto_commit: Option<bool>,
    pub auto_refresh: Option<bool>,
    pub auto_expunge: Option<bool>,
}

impl WriteOptions {
    pub fn commit() -> Self {
        Self {
            auto_commit: Some(true),
            ..Self::default()
        }
    }
}

/// Generic CRUD/query service over a [`Session`], bound to one entity type
/// for its lifetime.
///
/// Centralizes query construction, session-lifecycle policy and error
/// translation so resource services need add nothing beyond the entity type:
///
/// ```ignore
/// pub type TodoService<'s> = SqlxService<'s, Todo>;
/// ```
///
/// Lifecycle flags, each overridable per call:
/// - `auto_expunge` (default false): detach returned entities from tracking.
/// - `auto_refresh` (default true): re-read entity state after a write to
///   pick up store-generated defaults.
/// - `auto_commit` (default false): commit the transaction after a write
///   instead of leaving the flushed changes pending.
pub struct SqlxService<'s, T: Entity> {
    session: &'s mut Session,
    auto_expunge: bool,
    auto_refresh: bool,
    auto_commit: bool,
    _entity: PhantomData<T>,
}

impl<'s, T: Entity> SqlxService<'s, T> {
    pub fn new(session: &'s mut Session) -> Self {
        Self {
            session,
            auto_expunge: false,
            auto_refresh: true,
            auto_commit: false,
            _entity: PhantomData,
        }
    }

    pub fn auto_expunge(mut self, on: bool) -> Self {
        self.auto_expunge = on;
        self
    }

    pub fn auto_refresh(mut self, on: bool) -> Self {
        self.auto_refresh = on;
        self
    }

    pub fn auto_commit(mut self, on: bool) -> Self {
        self.auto_commit = on;
        self
    }

    pub fn session(&mut self) -> &mut Session {
        self.session
    }

    /// Count rows matching the criteria's equality filters. Ordering and
    /// pagination bounds are ignored.
    pub async fn count(&mut self, criteria: &Criteria) -> DataResult<u64> {
        let (sql, params) = self.filtered(criteria).build_count(T::id_column());
        let mut query = sqlx::query(&sql);
        for param in params {
            query = param.bind(query);
        }
        let conn = self.session.conn().await.map_err(SqlxErrorExt::into_data_error)?;
        let row = query
            .fetch_one(conn)
            .await
            .map_err(SqlxErrorExt::into_data_error)?;
        let count: i64 = row.try_get(0).map_err(SqlxErrorExt::into_data_error)?;
        Ok(count.max(0) as u64)
    }

    /// Persist a caller-constructed entity and return it with its
    /// store-assigned identifier.
    pub async fn create(&mut self, data: T) -> DataResult<T> {
        self.create_with(data, WriteOptions::default()).await
    }

    pub async fn create_with(&mut self, data: T, opts: WriteOptions) -> DataResult<T> {
        let mut entity = data;
        let columns = T::writable_columns();
        let values = self.checked_values(&entity, &columns)?;

        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            T::table_name(),
            columns.join(", "),
            placeholders,
            T::id_column(),
        );
        let mut query = sqlx::query(&sql);
        for value in values {
            query = value.bind(query);
        }
        let conn = self.session.conn().await.map_err(SqlxErrorExt::into_data_error)?;
        let row = query
            .fetch_one(conn)
            .await
            .map_err(SqlxErrorExt::into_data_error)?;
        let id: T::Id = row.try_get(0).map_err(SqlxErrorExt::into_data_error)?;
        entity.set_id(id);
        self.session.track(&entity);

        self.flush_or_commit(opts.auto_commit).await?;
        let entity = self.maybe_refresh(entity, opts.auto_refresh).await?;
        Ok(self.finish(entity, opts.auto_expunge))
    }

    /// Fetch exactly one row for the criteria's filters; fails with
    /// `NotFound` when nothing matches. Does not guard against multiple
    /// matches — the caller supplies a selective filter set.
    pub async fn get_one(&mut self, criteria: &Criteria) -> DataResult<T> {
        self.get_one_with(criteria, None).await
    }

    pub async fn get_one_with(
        &mut self,
        criteria: &Criteria,
        auto_expunge: Option<bool>,
    ) -> DataResult<T> {
        match self.get_one_or_none_with(criteria, auto_expunge).await? {
            Some(entity) => Ok(entity),
            None => Err(DataError::NotFound("no record found".into())),
        }
    }

    /// Like [`get_one`](Self::get_one), but absence is a value, not an error.
    pub async fn get_one_or_none(&mut self, criteria: &Criteria) -> DataResult<Option<T>> {
        self.get_one_or_none_with(criteria, None).await
    }

    pub async fn get_one_or_none_with(
        &mut self,
        criteria: &Criteria,
        auto_expunge: Option<bool>,
    ) -> DataResult<Option<T>> {
        let (sql, params) = self.filtered(criteria).build_select(&T::columns().join(", "));
        let mut query = sqlx::query(&sql);
        for param in params {
            query = param.bind(query);
        }
        let conn = self.session.conn().await.map_err(SqlxErrorExt::into_data_error)?;
        let row = query
            .fetch_optional(conn)
            .await
            .map_err(SqlxErrorExt::into_data_error)?;
        match row {
            Some(row) => {
                let entity = T::from_row(&row).map_err(SqlxErrorExt::into_data_error)?;
                Ok(Some(self.finish(entity, auto_expunge)))
            }
            None => Ok(None),
        }
    }

    /// True iff at least one row matches — a `LIMIT 1` probe on the id
    /// column, not a full count.
    pub async fn exists(&mut self, criteria: &Criteria) -> DataResult<bool> {
        let (sql, params) = self
            .filtered(criteria)
            .limit(1)
            .build_select(T::id_column());
        let mut query = sqlx::query(&sql);
        for param in params {
            query = param.bind(query);
        }
        let conn = self.session.conn().await.map_err(SqlxErrorExt::into_data_error)?;
        let row = query
            .fetch_optional(conn)
            .await
            .map_err(SqlxErrorExt::into_data_error)?;
        Ok(row.is_some())
    }

    /// Filtered, optionally ordered and paginated query. An empty match is
    /// an empty vec, never an error.
    pub async fn list(&mut self, criteria: &Criteria) -> DataResult<Vec<T>> {
        self.list_with(criteria, None).await
    }

    pub async fn list_with(
        &mut self,
        criteria: &Criteria,
        auto_expunge: Option<bool>,
    ) -> DataResult<Vec<T>> {
        let (sql, params) = self
            .shaped(criteria)
            .build_select(&T::columns().join(", "));
        let mut query = sqlx::query(&sql);
        for param in params {
            query = param.bind(query);
        }
        let conn = self.session.conn().await.map_err(SqlxErrorExt::into_data_error)?;
        let rows = query
            .fetch_all(conn)
            .await
            .map_err(SqlxErrorExt::into_data_error)?;
        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            let entity = T::from_row(row).map_err(SqlxErrorExt::into_data_error)?;
            items.push(self.finish(entity, auto_expunge));
        }
        Ok(items)
    }

    /// Same query as [`list`](Self::list), plus the pagination-independent
    /// total row count carried as a window-count column and read off the
    /// first row (0 when the page is empty).
    pub async fn list_and_count(&mut self, criteria: &Criteria) -> DataResult<(Vec<T>, u64)> {
        self.list_and_count_with(criteria, None).await
    }

    pub async fn list_and_count_with(
        &mut self,
        criteria: &Criteria,
        auto_expunge: Option<bool>,
    ) -> DataResult<(Vec<T>, u64)> {
        let (sql, params) = self
            .shaped(criteria)
            .build_select_with_total(&T::columns().join(", "), TOTAL_COUNT_ALIAS);
        let mut query = sqlx::query(&sql);
        for param in params {
            query = param.bind(query);
        }
        let conn = self.session.conn().await.map_err(SqlxErrorExt::into_data_error)?;
        let rows = query
            .fetch_all(conn)
            .await
            .map_err(SqlxErrorExt::into_data_error)?;

        let mut total: u64 = 0;
        let mut items = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if i == 0 {
                let count: i64 = row
                    .try_get(TOTAL_COUNT_ALIAS)
                    .map_err(SqlxErrorExt::into_data_error)?;
                total = count.max(0) as u64;
            }
            let entity = T::from_row(row).map_err(SqlxErrorExt::into_data_error)?;
            items.push(self.finish(entity, auto_expunge));
        }
        Ok((items, total))
    }

    /// Persist changes to an entity. A tracked entity is written in place; a
    /// detached one is merged back into the session first.
    pub async fn update(&mut self, data: T) -> DataResult<T> {
        self.update_with(data, WriteOptions::default()).await
    }

    pub async fn update_with(&mut self, data: T, opts: WriteOptions) -> DataResult<T> {
        let entity = if self.session.is_tracked(&data) {
            data
        } else {
            self.merge(data).await?
        };
        let id = self.require_id(&entity)?;

        let columns = T::writable_columns();
        let values = self.checked_values(&entity, &columns)?;
        let assignments = columns
            .iter()
            .map(|c| format!("{c} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            T::table_name(),
            assignments,
            T::id_column(),
        );
        let mut query = sqlx::query(&sql);
        for value in values {
            query = value.bind(query);
        }
        query = Into::<SqlValue>::into(id).bind(query);
        let conn = self.session.conn().await.map_err(SqlxErrorExt::into_data_error)?;
        query
            .execute(conn)
            .await
            .map_err(SqlxErrorExt::into_data_error)?;

        self.flush_or_commit(opts.auto_commit).await?;
        let entity = self.maybe_refresh(entity, opts.auto_refresh).await?;
        Ok(self.finish(entity, opts.auto_expunge))
    }

    /// Load the entity by identifier (`NotFound` if absent), delete it, and
    /// return its last known state.
    pub async fn delete(&mut self, id: T::Id) -> DataResult<T> {
        self.delete_with(id, WriteOptions::default()).await
    }

    pub async fn delete_with(&mut self, id: T::Id, opts: WriteOptions) -> DataResult<T> {
        let criteria = Criteria::new().eq(T::id_column(), id.clone());
        let instance = self.get_one_with(&criteria, Some(false)).await?;

        let sql = format!(
            "DELETE FROM {} WHERE {} = ?",
            T::table_name(),
            T::id_column(),
        );
        let query = Into::<SqlValue>::into(id).bind(sqlx::query(&sql));
        let conn = self.session.conn().await.map_err(SqlxErrorExt::into_data_error)?;
        query
            .execute(conn)
            .await
            .map_err(SqlxErrorExt::into_data_error)?;

        self.flush_or_commit(opts.auto_commit).await?;
        if opts.auto_expunge.unwrap_or(self.auto_expunge) {
            self.session.expunge(&instance);
        }
        Ok(instance)
    }

    /// Equality filters only — unknown attribute names are skipped with a
    /// warning, never an error.
    fn filtered(&self, criteria: &Criteria) -> QueryBuilder {
        let mut builder = QueryBuilder::new(T::table_name());
        for (field, value) in &criteria.filters {
            if T::has_column(field) {
                builder = builder.where_eq(field, value.clone());
            } else {
                tracing::warn!(
                    model = T::table_name(),
                    field = %field,
                    "attempted to filter by non-existent attribute"
                );
            }
        }
        builder
    }

    /// Filters plus ordering and pagination, for the list-shaped queries.
    fn shaped(&self, criteria: &Criteria) -> QueryBuilder {
        let mut builder = self.filtered(criteria);
        if let Some(order) = &criteria.order_by {
            if T::has_column(&order.field) {
                builder = builder.order_by(&order.field, order.direction);
            } else {
                tracing::warn!(
                    model = T::table_name(),
                    field = %order.field,
                    "attempted to order by non-existent attribute"
                );
            }
        }
        if let Some(offset) = criteria.offset {
            builder = builder.offset(offset);
        }
        if let Some(limit) = criteria.limit {
            builder = builder.limit(limit);
        }
        builder
    }

    /// Fetch-and-copy a detached instance back into the session. The row
    /// must still exist to re-attach.
    async fn merge(&mut self, data: T) -> DataResult<T> {
        let id = self.require_id(&data)?;
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?",
            T::id_column(),
            T::table_name(),
            T::id_column(),
        );
        let query = Into::<SqlValue>::into(id).bind(sqlx::query(&sql));
        let conn = self.session.conn().await.map_err(SqlxErrorExt::into_data_error)?;
        let row = query
            .fetch_optional(conn)
            .await
            .map_err(SqlxErrorExt::into_data_error)?;
        match row {
            Some(_) => {
                self.session.track(&data);
                Ok(data)
            }
            None => {
                tracing::error!(
                    model = T::table_name(),
                    "failed to merge instance for update: row no longer exists"
                );
                Err(DataError::service_msg(format!(
                    "failed to merge detached {} instance: row no longer exists",
                    T::table_name(),
                )))
            }
        }
    }

    async fn flush_or_commit(&mut self, auto_commit: Option<bool>) -> DataResult<()> {
        // Statements have already been flushed to the open transaction.
        if auto_commit.unwrap_or(self.auto_commit) {
            self.session.commit().await?;
        }
        Ok(())
    }

    async fn maybe_refresh(&mut self, entity: T, auto_refresh: Option<bool>) -> DataResult<T> {
        if !auto_refresh.unwrap_or(self.auto_refresh) {
            return Ok(entity);
        }
        let id = self.require_id(&entity)?;
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?",
            T::columns().join(", "),
            T::table_name(),
            T::id_column(),
        );
        let query = Into::<SqlValue>::into(id).bind(sqlx::query(&sql));
        let conn = self.session.conn().await.map_err(SqlxErrorExt::into_data_error)?;
        let row = query
            .fetch_optional(conn)
            .await
            .map_err(SqlxErrorExt::into_data_error)?;
        match row {
            Some(row) => T::from_row(&row).map_err(SqlxErrorExt::into_data_error),
            None => Err(DataError::service_msg(format!(
                "failed to refresh {} instance: row no longer exists",
                T::table_name(),
            ))),
        }
    }

    /// Track-or-detach the entity per the resolved expunge flag.
    fn finish(&mut self, entity: T, auto_expunge: Option<bool>) -> T {
        if auto_expunge.unwrap_or(self.auto_expunge) {
            self.session.expunge(&entity);
        } else {
            self.session.track(&entity);
        }
        entity
    }

    fn require_id(&self, entity: &T) -> DataResult<T::Id> {
        entity.id().ok_or_else(|| {
            DataError::service_msg(format!(
                "{} instance has no assigned identifier",
                T::table_name(),
            ))
        })
    }

    fn checked_values(&self, entity: &T, columns: &[&'static str]) -> DataResult<Vec<SqlValue>> {
        let values = entity.values();
        if values.len() != columns.len() {
            return Err(DataError::service_msg(format!(
                "entity {} reports {} values for {} writable columns",
                T::table_name(),
                values.len(),
                columns.len(),
            )));
        }
        Ok(values)
    }
}
