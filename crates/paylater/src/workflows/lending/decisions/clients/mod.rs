mod http;

pub use http::{HttpLedgerNotifier, HttpTransactionSource};

use async_trait::async_trait;

use super::domain::{Plan, Transaction, UserId};

/// Upstream client providing a borrower's 90-day transaction history.
///
/// An empty (but successful) fetch is a legitimate no-history result; any
/// error below means the history is unknown and the decision must be
/// aborted, never scored as if the history were empty.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn fetch_transactions(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Transaction>, TransactionSourceError>;
}

/// Failure classes for the history fetch.
#[derive(Debug, thiserror::Error)]
pub enum TransactionSourceError {
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("transaction source timed out")]
    Timeout,
    #[error("transaction source error: {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },
}

/// Outbound notification hook toward the downstream ledger.
///
/// Delivery is best-effort: callers log failures and move on, so the
/// decision response never blocks on nor fails from this seam.
#[async_trait]
pub trait LedgerNotifier: Send + Sync {
    async fn plan_created(&self, plan: &Plan) -> Result<(), NotifyError>;
}

/// Notification dispatch error, surfaced only to logs and metrics.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification retries exhausted after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
