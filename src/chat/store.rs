//! Ciphertext store for chat messages.
//!
//! DESIGN
//! ======
//! Rows carry only the session id, the caller's user id, the base64 blob and
//! a user/bot flag. The session key never reaches this module, so the store
//! can only ever hold ciphertext.
//!
//! ERROR HANDLING
//! ==============
//! Writes from the send flow and the teardown purge are best-effort: they run
//! as detached tasks, failures are logged and swallowed, and nothing waits on
//! them. Chat keeps working when the store is down.

use std::sync::Arc;

use sqlx::{PgPool, Row};
use tracing::{debug, error};
use uuid::Uuid;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::error::ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Database(_) => "E_DATABASE",
        }
    }

    fn retryable(&self) -> bool {
        true
    }
}

/// Row written for each sent or received message. Mirrors `ephemeral_chats`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedRow {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub content_encrypted: String,
    pub is_user_message: bool,
}

/// Row read back for history reload.
#[derive(Debug, Clone)]
pub struct StoredRow {
    pub id: Uuid,
    pub content_encrypted: String,
    pub is_user_message: bool,
}

/// Remote persistence collaborator. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ChatStore: Send + Sync {
    /// Insert one encrypted message row.
    async fn insert(&self, row: &EncryptedRow) -> Result<(), StoreError>;

    /// Delete every row for a session. Returns the number of rows removed.
    async fn delete_session(&self, session_id: Uuid) -> Result<u64, StoreError>;

    /// List a session's rows, oldest first.
    async fn list_session(&self, session_id: Uuid) -> Result<Vec<StoredRow>, StoreError>;
}

// =============================================================================
// POSTGRES
// =============================================================================

/// `ChatStore` backed by the `ephemeral_chats` table.
#[derive(Clone)]
pub struct PgChatStore {
    pool: PgPool,
}

impl PgChatStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ChatStore for PgChatStore {
    async fn insert(&self, row: &EncryptedRow) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO ephemeral_chats (session_id, user_id, content_encrypted, is_user_message)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(row.session_id)
        .bind(row.user_id)
        .bind(&row.content_encrypted)
        .bind(row.is_user_message)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_session(&self, session_id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM ephemeral_chats WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_session(&self, session_id: Uuid) -> Result<Vec<StoredRow>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, content_encrypted, is_user_message
             FROM ephemeral_chats
             WHERE session_id = $1
             ORDER BY created_at ASC, id ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| StoredRow {
                id: r.get("id"),
                content_encrypted: r.get("content_encrypted"),
                is_user_message: r.get("is_user_message"),
            })
            .collect())
    }
}

// =============================================================================
// BEST-EFFORT SIDE EFFECTS
// =============================================================================

/// Fire-and-forget insert. The task handle is dropped on purpose; the result
/// is only logged.
pub fn persist_best_effort(store: Arc<dyn ChatStore>, row: EncryptedRow) {
    tokio::spawn(async move {
        match store.insert(&row).await {
            Ok(()) => debug!(session_id = %row.session_id, user = row.is_user_message, "chat: row persisted"),
            Err(e) => error!(error = %e, session_id = %row.session_id, "chat: persist failed"),
        }
    });
}

/// Fire-and-forget purge of every row for `session_id`.
pub fn purge_best_effort(store: Arc<dyn ChatStore>, session_id: Uuid) {
    tokio::spawn(async move {
        match store.delete_session(session_id).await {
            Ok(count) => debug!(%session_id, count, "chat: session rows purged"),
            Err(e) => error!(error = %e, %session_id, "chat: purge failed"),
        }
    });
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
