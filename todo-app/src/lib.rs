//! # todo-app — domain layer of the todo API
//!
//! Entities (User, Todo, UserSession), their resource services, schema
//! migrations, and the app-level config/telemetry glue. All data access goes
//! through [`todo_data`]'s generic service; the HTTP layer sits above this
//! crate.

pub mod config;
pub mod models;
pub mod services;
pub mod sorting;
pub mod telemetry;

pub use config::Config;
pub use models::{generate_session_token, Todo, User, UserSession};
pub use services::{TodoService, UserService, UserSessionService};

/// Embedded sqlx migrations for the application schema.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
