//! Provision command - Creates the store tables and exits.

use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{StoreSession, UserRepository, UserStore};

/// Execute the provision command
pub async fn execute(config: Config) -> AppResult<()> {
    let session = Arc::new(StoreSession::new());
    session.open(&config.database).await?;

    let provisioned = UserStore::new(session.clone()).ensure_table().await;
    let closed = session.close().await;

    provisioned?;
    closed?;
    tracing::info!("Provisioning complete");
    Ok(())
}
