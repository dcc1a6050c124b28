//! User service - Handles user-related business logic.
//!
//! Validates submissions, hashes passwords and delegates persistence to a
//! [`UserRepository`].

use async_trait::async_trait;
use std::sync::Arc;
use validator::Validate;

use crate::domain::{NewUser, NewUserRecord, Password, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UserRepository;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Register a user and return it as persisted
    async fn create_user(&self, user: NewUser) -> AppResult<User>;

    /// Get user by ID
    async fn get_user(&self, id: i32) -> AppResult<User>;

    /// List all users
    async fn list_users(&self) -> AppResult<Vec<User>>;
}

/// Concrete implementation of UserService over a repository.
pub struct UserManager {
    users: Arc<dyn UserRepository>,
}

impl UserManager {
    /// Create new user service instance
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        user.validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        let password = Password::new(&user.password)?;
        let record = NewUserRecord::from_submission(user, password.into_string());

        self.users.create(record).await
    }

    async fn get_user(&self, id: i32) -> AppResult<User> {
        self.users.find_by_id(id).await?.ok_or_not_found()
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.users.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::MockUserRepository;
    use mockall::predicate::eq;
    use tokio_test::{assert_err, assert_ok};

    fn submission(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            password: "p".to_string(),
        }
    }

    fn persisted(id: i32, record: NewUserRecord) -> User {
        User {
            id,
            email: record.email,
            first_name: record.first_name,
            last_name: record.last_name,
            password: record.password_hash,
        }
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let mut repo = MockUserRepository::new();
        repo.expect_create()
            .withf(|record| {
                record.email == "a@x.com"
                    && record.password_hash != "p"
                    && Password::from_hash(record.password_hash.clone()).verify("p")
            })
            .times(1)
            .returning(|record| Ok(persisted(1, record)));

        let service = UserManager::new(Arc::new(repo));
        let user = assert_ok!(service.create_user(submission("a@x.com")).await);

        assert_eq!(user.id, 1);
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.first_name, "A");
        assert_eq!(user.last_name, "B");
    }

    #[tokio::test]
    async fn test_create_user_rejects_invalid_submission() {
        let mut repo = MockUserRepository::new();
        repo.expect_create().never();

        let service = UserManager::new(Arc::new(repo));
        let err = assert_err!(service.create_user(submission("not-an-email")).await);

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_user_propagates_duplicate() {
        let mut repo = MockUserRepository::new();
        repo.expect_create()
            .returning(|_| Err(AppError::DuplicateEmail));

        let service = UserManager::new(Arc::new(repo));
        let result = service.create_user(submission("a@x.com")).await;

        assert!(matches!(result, Err(AppError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .with(eq(42))
            .returning(|_| Ok(None));

        let service = UserManager::new(Arc::new(repo));

        assert!(matches!(service.get_user(42).await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_users() {
        let mut repo = MockUserRepository::new();
        repo.expect_list().returning(|| {
            Ok(vec![persisted(
                1,
                NewUserRecord::from_submission(submission("a@x.com"), "hash".to_string()),
            )])
        });

        let service = UserManager::new(Arc::new(repo));
        let users = service.list_users().await.unwrap();

        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, "a@x.com");
    }
}
