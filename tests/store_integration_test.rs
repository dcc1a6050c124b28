//! Store tests against a live PostgreSQL.
//!
//! Ignored by default. Point `DB_USER`, `DB_PASSWORD`, `DB_NAME` (and
//! optionally `DB_HOST`/`DB_PORT`) at a scratch database, then run
//! `cargo test -- --ignored`. The `users` table is truncated.

use std::sync::Arc;

use sea_orm::{ConnectionTrait, Statement};

use todo_api::config::{Config, DatabaseCredentials};
use todo_api::domain::{NewUser, NewUserRecord};
use todo_api::errors::AppError;
use todo_api::infra::{SessionStatus, StoreSession, UserRepository, UserStore};
use todo_api::services::{UserManager, UserService};

fn submission(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        first_name: "A".to_string(),
        last_name: "B".to_string(),
        password: "p".to_string(),
    }
}

async fn open_session(config: &Config) -> Arc<StoreSession> {
    let session = Arc::new(StoreSession::new());
    session.open(&config.database).await.unwrap();
    session
}

async fn count_users(session: &StoreSession) -> i64 {
    let connection = session.connection().await.unwrap();
    let row = connection
        .query_one(Statement::from_string(
            connection.get_database_backend(),
            "SELECT COUNT(*) AS n FROM users",
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "n").unwrap()
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_user_workflow_against_postgres() {
    let config = Config::from_env().unwrap();
    let session = open_session(&config).await;
    let repo = Arc::new(UserStore::new(session.clone()));

    // Provisioning is idempotent
    repo.ensure_table().await.unwrap();
    repo.ensure_table().await.unwrap();

    let connection = session.connection().await.unwrap();
    connection
        .execute(Statement::from_string(
            connection.get_database_backend(),
            "TRUNCATE users RESTART IDENTITY",
        ))
        .await
        .unwrap();

    let service = UserManager::new(repo.clone());

    // Scenario on an empty table
    let user = service.create_user(submission("a@x.com")).await.unwrap();
    assert_eq!(user.id, 1);
    assert_eq!(user.email, "a@x.com");
    assert_eq!(user.first_name, "A");
    assert_eq!(user.last_name, "B");
    assert_ne!(user.password, "p");

    // Second identical call
    let duplicate = service.create_user(submission("a@x.com")).await;
    assert!(matches!(duplicate, Err(AppError::DuplicateEmail)));
    assert_eq!(count_users(&session).await, 1);

    // Concurrent creations each get their own row back
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let repo = repo.clone();
            tokio::spawn(async move {
                let email = format!("concurrent{}@x.com", i);
                let created = repo
                    .create(NewUserRecord {
                        email: email.clone(),
                        first_name: "C".to_string(),
                        last_name: "D".to_string(),
                        password_hash: "hash".to_string(),
                    })
                    .await
                    .unwrap();
                (email, created)
            })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        let (email, created) = handle.await.unwrap();
        assert_eq!(created.email, email);
        let stored = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.email, email);
        ids.push(created.id);
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 8);
    assert_eq!(count_users(&session).await, 9);

    session.close().await.unwrap();
    assert_eq!(session.status().await, SessionStatus::Closed);
    session.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_rejected_credentials_are_authentication_errors() {
    let config = Config::from_env().unwrap();
    let mut credentials = DatabaseCredentials::new(
        config.database.user.clone(),
        "definitely-not-the-password",
        config.database.database.clone(),
    );
    credentials.host = config.database.host.clone();
    credentials.port = config.database.port;

    let session = StoreSession::new();
    let result = session.open(&credentials).await;

    assert!(matches!(result, Err(AppError::Authentication)));
}
