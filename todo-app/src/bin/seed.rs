//! Seed a demo user with a handful of todos, for local development.

use std::str::FromStr;

use anyhow::{anyhow, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use todo_app::{telemetry, Config, Todo, TodoService, User, UserService, MIGRATOR};
use todo_data::{Criteria, Session};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();
    let config = Config::from_env()?;

    let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    MIGRATOR.run(&pool).await?;

    let mut session = Session::begin(&pool).await?;

    let mut users = UserService::new(&mut session).auto_commit(true);
    if users
        .exists(&Criteria::new().eq("username", "demo"))
        .await?
    {
        tracing::info!("demo user already present, nothing to seed");
        return Ok(());
    }

    // Placeholder hash; real hashes come from the auth layer.
    let user = users
        .create(User::new("demo", "$argon2id$v=19$placeholder"))
        .await?;
    let user_id = user
        .id
        .ok_or_else(|| anyhow!("user id missing after create"))?;
    tracing::info!(user_id, "created demo user");

    let mut todos = TodoService::new(&mut session).auto_commit(true);
    for (title, description) in [
        ("Buy groceries", Some("milk, eggs, coffee".to_string())),
        ("Write weekly report", None),
        ("Book dentist appointment", None),
    ] {
        let todo = todos.create(Todo::new(user_id, title, description)).await?;
        tracing::info!(todo_id = todo.id, title = %todo.title, "created todo");
    }

    Ok(())
}
