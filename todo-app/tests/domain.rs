use chrono::Duration;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use todo_app::sorting::timestamp_order_by;
use todo_app::{Todo, TodoService, User, UserService, UserSession, UserSessionService, MIGRATOR};
use todo_data::{Criteria, DataError, Page, Pageable, Session};

async fn setup_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    MIGRATOR.run(&pool).await.unwrap();
    pool
}

async fn create_user(session: &mut Session, username: &str) -> User {
    UserService::new(session)
        .create(User::new(username, "$argon2id$v=19$test"))
        .await
        .unwrap()
}

#[tokio::test]
async fn todos_are_scoped_to_their_user() {
    let pool = setup_pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    let alice = create_user(&mut session, "alice").await.id.unwrap();
    let bob = create_user(&mut session, "bob").await.id.unwrap();

    let mut todos = TodoService::new(&mut session);
    for title in ["one", "two", "three"] {
        todos.create(Todo::new(alice, title, None)).await.unwrap();
    }
    todos.create(Todo::new(bob, "other", None)).await.unwrap();

    let mine = todos.list(&Criteria::new().eq("user_id", alice)).await.unwrap();
    let count = todos.count(&Criteria::new().eq("user_id", alice)).await.unwrap();

    assert_eq!(mine.len(), 3);
    assert_eq!(count, 3);
    assert!(mine.iter().all(|t| t.user_id == alice));
}

#[tokio::test]
async fn paginated_todo_listing() {
    let pool = setup_pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    let user_id = create_user(&mut session, "alice").await.id.unwrap();

    let mut todos = TodoService::new(&mut session);
    for i in 0..5 {
        todos
            .create(Todo::new(user_id, format!("todo {i}"), None))
            .await
            .unwrap();
    }

    let pageable = Pageable::new(2, 2);
    let criteria = Criteria::new().eq("user_id", user_id).page(&pageable);
    let (items, total) = todos.list_and_count(&criteria).await.unwrap();
    let page = Page::new(items, &pageable, total);

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, 5);
    assert_eq!(page.pages, 3);
}

#[tokio::test]
async fn timestamp_sort_parameter_orders_listing() {
    let pool = setup_pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    let user_id = create_user(&mut session, "alice").await.id.unwrap();

    let mut todos = TodoService::new(&mut session);
    for title in ["one", "two", "three"] {
        todos.create(Todo::new(user_id, title, None)).await.unwrap();
    }

    let order = timestamp_order_by("createdAt.desc").unwrap();
    let items = todos
        .list(&Criteria::new().eq("user_id", user_id).order_by(order))
        .await
        .unwrap();

    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|t| t.created_at.is_some()));
}

#[tokio::test]
async fn duplicate_username_is_conflict() {
    let pool = setup_pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    create_user(&mut session, "alice").await;

    let mut users = UserService::new(&mut session);
    let err = users
        .create(User::new("alice", "$argon2id$v=19$other"))
        .await
        .unwrap_err();

    assert!(matches!(err, DataError::Conflict(_)));
}

#[tokio::test]
async fn audit_timestamps_are_store_generated() {
    let pool = setup_pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    let user_id = create_user(&mut session, "alice").await.id.unwrap();

    let mut todos = TodoService::new(&mut session);
    let created = todos.create(Todo::new(user_id, "task", None)).await.unwrap();
    assert!(created.created_at.is_some());
    assert!(created.updated_at.is_some());

    let mut done = created.clone();
    done.is_completed = true;
    let updated = todos.update(done).await.unwrap();

    assert!(updated.is_completed);
    assert!(updated.updated_at.unwrap() >= created.updated_at.unwrap());
}

#[tokio::test]
async fn session_lookup_by_token() {
    let pool = setup_pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    let user_id = create_user(&mut session, "alice").await.id.unwrap();

    let minted = UserSession::new(user_id, Duration::hours(1));
    let token = minted.session_token.clone();
    let mut sessions = UserSessionService::new(&mut session);
    let stored = sessions.create(minted).await.unwrap();
    assert!(!stored.is_expired());

    let fetched = sessions
        .get_one(&Criteria::new().eq("session_token", token))
        .await
        .unwrap();
    assert_eq!(fetched.id, stored.id);
    assert_eq!(fetched.user_id, user_id);
}

#[tokio::test]
async fn deleting_a_user_cascades_to_sessions() {
    let pool = setup_pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    let user_id = create_user(&mut session, "alice").await.id.unwrap();

    let mut sessions = UserSessionService::new(&mut session);
    sessions
        .create(UserSession::new(user_id, Duration::hours(1)))
        .await
        .unwrap();

    let mut users = UserService::new(&mut session);
    users.delete(user_id).await.unwrap();

    let mut sessions = UserSessionService::new(&mut session);
    let remaining = sessions
        .exists(&Criteria::new().eq("user_id", user_id))
        .await
        .unwrap();
    assert!(!remaining);
}

#[tokio::test]
async fn deleting_a_user_with_todos_is_conflict() {
    let pool = setup_pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    let user_id = create_user(&mut session, "alice").await.id.unwrap();

    let mut todos = TodoService::new(&mut session);
    todos.create(Todo::new(user_id, "task", None)).await.unwrap();

    let mut users = UserService::new(&mut session);
    let err = users.delete(user_id).await.unwrap_err();

    assert!(matches!(err, DataError::Conflict(_)));
}
