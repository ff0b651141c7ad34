use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use todo_data::{Entity, SqlValue};

/// A registered account. The password is hashed by the auth layer before it
/// reaches this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Option<i64>,
    pub username: String,
    pub hashed_password: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(username: impl Into<String>, hashed_password: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            hashed_password: hashed_password.into(),
            created_at: None,
            updated_at: None,
        }
    }
}

impl Entity for User {
    type Id = i64;

    fn table_name() -> &'static str {
        "users"
    }

    fn columns() -> &'static [&'static str] {
        &["id", "username", "hashed_password", "created_at", "updated_at"]
    }

    fn generated_columns() -> &'static [&'static str] {
        &["created_at", "updated_at"]
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.username.as_str().into(),
            self.hashed_password.as_str().into(),
        ]
    }
}

/// A todo item owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    pub id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub user_id: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Todo {
    pub fn new(user_id: i64, title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description,
            is_completed: false,
            user_id,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Entity for Todo {
    type Id = i64;

    fn table_name() -> &'static str {
        "todo"
    }

    fn columns() -> &'static [&'static str] {
        &[
            "id",
            "title",
            "description",
            "is_completed",
            "user_id",
            "created_at",
            "updated_at",
        ]
    }

    fn generated_columns() -> &'static [&'static str] {
        &["created_at", "updated_at"]
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.title.as_str().into(),
            self.description.as_deref().into(),
            self.is_completed.into(),
            self.user_id.into(),
        ]
    }
}

/// A server-side login session, looked up by its opaque token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSession {
    pub id: Option<i64>,
    pub session_token: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserSession {
    /// Mint a session for `user_id` with a fresh token, expiring after `ttl`.
    pub fn new(user_id: i64, ttl: Duration) -> Self {
        Self {
            id: None,
            session_token: generate_session_token(),
            user_id,
            expires_at: Utc::now() + ttl,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

impl Entity for UserSession {
    type Id = i64;

    fn table_name() -> &'static str {
        "user_sessions"
    }

    fn columns() -> &'static [&'static str] {
        &[
            "id",
            "session_token",
            "user_id",
            "expires_at",
            "created_at",
            "updated_at",
        ]
    }

    fn generated_columns() -> &'static [&'static str] {
        &["created_at", "updated_at"]
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.session_token.as_str().into(),
            self.user_id.into(),
            self.expires_at.into(),
        ]
    }
}

/// An opaque URL-safe token, 48 random bytes base64-encoded.
pub fn generate_session_token() -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use rand::RngCore;

    let mut bytes = [0u8; 48];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_tokens_are_unique_and_url_safe() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn fresh_session_is_not_expired() {
        let session = UserSession::new(1, Duration::hours(1));
        assert!(!session.is_expired());
        let stale = UserSession {
            expires_at: Utc::now() - Duration::seconds(1),
            ..session
        };
        assert!(stale.is_expired());
    }

    #[test]
    fn writable_columns_skip_generated_ones() {
        let columns = <Todo as Entity>::writable_columns();
        assert_eq!(columns, vec!["title", "description", "is_completed", "user_id"]);
        assert_eq!(Todo::new(1, "x", None).values().len(), columns.len());
    }
}
