//! Error type for repository operations that enforce domain rules inside a
//! transaction (workflow transitions, bulk updates).

use assetdesk_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// The operation was refused by a domain rule; nothing was written.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// The database failed; the transaction was rolled back.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
