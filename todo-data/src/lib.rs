//! # todo-data — generic data-access layer
//!
//! A typed, entity-generic CRUD/query service over a SQLite session.
//!
//! The building blocks:
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Entity`] | Table/column registry plus id accessors and bind values |
//! | [`Criteria`] | Per-call equality filters, ordering, offset/limit |
//! | [`Session`] | Unit-of-work handle: live transaction + tracked identities |
//! | [`SqlxService`] | Generic count/create/get/list/update/delete/exists over a session |
//! | [`DataError`] | Three-kind error taxonomy: NotFound / Conflict / Service |
//! | [`Page`], [`Pageable`] | Pagination parameters and result metadata |
//!
//! # Quick start
//!
//! ```ignore
//! let mut session = Session::begin(&pool).await?;
//! let mut todos = SqlxService::<Todo>::new(&mut session);
//!
//! let mine = todos
//!     .list(&Criteria::new().eq("user_id", user_id).limit(20))
//!     .await?;
//! ```
//!
//! Resource services are plain type aliases — the generic layer carries all
//! behavior:
//!
//! ```ignore
//! pub type TodoService<'s> = SqlxService<'s, Todo>;
//! ```

pub mod entity;
pub mod error;
pub mod filter;
pub mod page;
pub mod query;
pub mod service;
pub mod session;
pub mod value;

pub use entity::Entity;
pub use error::{DataError, DataResult, SqlxErrorExt};
pub use filter::{Criteria, Direction, OrderBy};
pub use page::{Page, Pageable};
pub use query::QueryBuilder;
pub use service::{SqlxService, WriteOptions};
pub use session::Session;
pub use value::SqlValue;

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{Criteria, DataError, DataResult, Entity, OrderBy, Page, Pageable, Session, SqlValue, SqlxService};
}
