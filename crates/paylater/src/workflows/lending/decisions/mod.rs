//! Credit decision intake, scoring, and repayment planning.
//!
//! The scoring pipeline is deterministic and side-effect free; identical
//! inputs always produce identical decisions, which keeps money-moving
//! outcomes auditable. Collaborators that perform I/O (the bank history
//! source, persistence, the ledger webhook) are trait seams wired in by the
//! service layer.

pub mod clients;
pub mod domain;
pub mod plan;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use clients::{
    HttpLedgerNotifier, HttpTransactionSource, LedgerNotifier, NotifyError, TransactionSource,
    TransactionSourceError,
};
pub use domain::{
    Decision, DecisionFactors, DecisionId, DecisionRecord, Installment, InstallmentStatus, Plan,
    PlanId, Ratio, Transaction, TransactionKind, UserId,
};
pub use plan::{build_plan, INSTALLMENT_COUNT, INSTALLMENT_INTERVAL_DAYS};
pub use repository::{
    DecisionRepository, DecisionView, InstallmentView, PlanRepository, PlanView, RepositoryError,
};
pub use router::decision_router;
pub use scoring::{
    CreditTier, EmptyHistory, ScoringConfig, ScoringConfigError, ScoringEngine,
};
pub use service::{DecisionRequest, DecisionService, DecisionServiceError};
