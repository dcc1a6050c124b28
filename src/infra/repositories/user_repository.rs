//! User repository - create-and-confirm workflow over the store session.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, DatabaseTransaction, EntityTrait, NotSet, QueryOrder, Set, TransactionTrait,
};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::config::USERS_TABLE;
use crate::domain::{NewUserRecord, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::db::{ColumnKind, ColumnSpec, StoreSession, TableSchema};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Declared schema of the user table.
pub fn users_schema() -> TableSchema {
    TableSchema::new(USERS_TABLE)
        .column(ColumnSpec::new("id", ColumnKind::Serial).primary_key())
        .column(ColumnSpec::new("firstname", ColumnKind::Text))
        .column(ColumnSpec::new("lastname", ColumnKind::Text))
        .column(ColumnSpec::new("password", ColumnKind::Text))
        .column(ColumnSpec::new("email", ColumnKind::Text).unique())
}

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Provision the user table. Safe to call on every start.
    async fn ensure_table(&self) -> AppResult<()>;

    /// Insert a user and return the row as persisted.
    ///
    /// The identity comes from the insert itself, so concurrent creations
    /// never observe each other's rows.
    async fn create(&self, record: NewUserRecord) -> AppResult<User>;

    /// Find user by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>>;

    /// List all users, oldest first
    async fn list(&self) -> AppResult<Vec<User>>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    session: Arc<StoreSession>,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(session: Arc<StoreSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn ensure_table(&self) -> AppResult<()> {
        self.session.ensure_table(&users_schema()).await
    }

    async fn create(&self, record: NewUserRecord) -> AppResult<User> {
        let db = self.session.connection().await?;
        let txn = db.begin().await.map_err(AppError::from)?;

        match insert_and_confirm(&txn, record).await {
            Ok(user) => {
                txn.commit().await.map_err(AppError::from)?;
                tracing::info!(user_id = user.id, "User created");
                Ok(user)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let db = self.session.connection().await?;
        let result = UserEntity::find_by_id(id)
            .one(&*db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let db = self.session.connection().await?;
        let models = UserEntity::find()
            .order_by_asc(user::Column::Id)
            .all(&*db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(User::from).collect())
    }
}

/// Insert with `RETURNING`, then re-read the row by the returned identity.
async fn insert_and_confirm(txn: &DatabaseTransaction, record: NewUserRecord) -> AppResult<User> {
    let active_model = ActiveModel {
        id: NotSet,
        first_name: Set(record.first_name),
        last_name: Set(record.last_name),
        password: Set(record.password_hash),
        email: Set(record.email),
    };

    let inserted = active_model.insert(txn).await.map_err(AppError::from)?;

    let confirmed = UserEntity::find_by_id(inserted.id)
        .one(txn)
        .await
        .map_err(AppError::from)?
        .ok_or_not_found()?;

    Ok(User::from(confirmed))
}
