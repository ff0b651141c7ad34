use std::collections::HashSet;

use sqlx::sqlite::{Sqlite, SqliteConnection, SqlitePool};
use sqlx::Transaction;

use crate::entity::Entity;
use crate::error::{DataResult, SqlxErrorExt};

/// A unit-of-work handle over one database connection.
///
/// The session owns the live transaction and the identity set of tracked
/// entities. Callers open it with [`Session::begin`] and close it by
/// committing or dropping it — dropping rolls back anything uncommitted.
/// Services never create or destroy sessions; one is handed to them at
/// construction.
///
/// After a [`commit`](Session::commit) or [`rollback`](Session::rollback) the
/// next operation lazily begins a fresh transaction on the same pool.
pub struct Session {
    pool: SqlitePool,
    tx: Option<Transaction<'static, Sqlite>>,
    tracked: HashSet<(&'static str, String)>,
}

impl Session {
    /// Open a session with its own transaction.
    pub async fn begin(pool: &SqlitePool) -> DataResult<Self> {
        let tx = pool.begin().await.map_err(SqlxErrorExt::into_data_error)?;
        Ok(Self {
            pool: pool.clone(),
            tx: Some(tx),
            tracked: HashSet::new(),
        })
    }

    /// The active transaction's connection, beginning a new transaction if
    /// the previous one was closed.
    pub(crate) async fn conn(&mut self) -> Result<&mut SqliteConnection, sqlx::Error> {
        let tx = match self.tx.take() {
            Some(tx) => tx,
            None => self.pool.begin().await?,
        };
        Ok(&mut **self.tx.insert(tx))
    }

    /// Durably commit the current transaction.
    pub async fn commit(&mut self) -> DataResult<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await.map_err(SqlxErrorExt::into_data_error)?;
        }
        Ok(())
    }

    /// Discard all uncommitted changes and detach every tracked entity.
    pub async fn rollback(&mut self) -> DataResult<()> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await.map_err(SqlxErrorExt::into_data_error)?;
        }
        self.tracked.clear();
        Ok(())
    }

    /// Whether an entity's identity is tracked by this session.
    pub fn is_tracked<T: Entity>(&self, entity: &T) -> bool {
        match entity.id() {
            Some(id) => self.tracked.contains(&(T::table_name(), id.to_string())),
            None => false,
        }
    }

    /// Detach an entity from session tracking without touching the store.
    pub fn expunge<T: Entity>(&mut self, entity: &T) {
        if let Some(id) = entity.id() {
            self.tracked.remove(&(T::table_name(), id.to_string()));
        }
    }

    pub(crate) fn track<T: Entity>(&mut self, entity: &T) {
        if let Some(id) = entity.id() {
            self.tracked.insert((T::table_name(), id.to_string()));
        }
    }
}
