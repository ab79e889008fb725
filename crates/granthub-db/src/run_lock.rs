//! Store-wide lock that keeps pipeline runs in different processes apart.
//!
//! The lock is a Postgres transaction-scoped advisory lock. It lives on one
//! pooled connection for as long as the [`PipelineRunLock`] is held, and
//! disappears with the transaction on [`PipelineRunLock::unlock`], on drop, or
//! when the holding process dies.

use sqlx::{PgPool, Postgres, Transaction};

use crate::DbError;

/// Advisory lock key shared by every granthub process ("granthub" in ASCII).
pub const PIPELINE_RUN_LOCK_KEY: i64 = 0x6772_616e_7468_7562;

pub struct PipelineRunLock {
    tx: Option<Transaction<'static, Postgres>>,
}

impl std::fmt::Debug for PipelineRunLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineRunLock")
            .field("held", &self.tx.is_some())
            .finish()
    }
}

impl PipelineRunLock {
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.tx.is_some()
    }

    /// Release the lock now. Calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] if the rollback fails. The lock is released
    /// anyway once the connection is closed or reused.
    pub async fn unlock(&mut self) -> Result<(), DbError> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
        }
        Ok(())
    }
}

/// Try to take the pipeline run lock without waiting.
///
/// Returns `None` when another session already holds it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a connection cannot be acquired or the lock
/// query fails.
pub async fn try_lock_pipeline_run(pool: &PgPool) -> Result<Option<PipelineRunLock>, DbError> {
    let mut tx = pool.begin().await?;

    let acquired = sqlx::query_scalar::<_, bool>("SELECT pg_try_advisory_xact_lock($1)")
        .bind(PIPELINE_RUN_LOCK_KEY)
        .fetch_one(&mut *tx)
        .await?;

    if !acquired {
        tx.rollback().await?;
        return Ok(None);
    }

    Ok(Some(PipelineRunLock { tx: Some(tx) }))
}
