use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use super::clients::{LedgerNotifier, TransactionSource, TransactionSourceError};
use super::domain::{DecisionId, DecisionRecord, Plan, PlanId, UserId};
use super::plan::build_plan;
use super::repository::{DecisionRepository, PlanRepository, RepositoryError};
use super::scoring::{limit_bucket, ScoringEngine};

/// Decisions returned per user by the history lookup.
const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Inbound request for a credit decision.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionRequest {
    pub user_id: UserId,
    pub amount_cents_requested: i64,
    /// Anchors the repayment schedule; the HTTP boundary defaults it to
    /// today when absent.
    #[serde(default)]
    pub evaluated_on: Option<NaiveDate>,
}

/// Service composing the scoring engine, persistence seams, and upstream
/// collaborators into the decision workflow.
pub struct DecisionService<S, N, D, P> {
    source: Arc<S>,
    notifier: Arc<N>,
    decisions: Arc<D>,
    plans: Arc<P>,
    engine: ScoringEngine,
}

impl<S, N, D, P> DecisionService<S, N, D, P>
where
    S: TransactionSource + 'static,
    N: LedgerNotifier + 'static,
    D: DecisionRepository + 'static,
    P: PlanRepository + 'static,
{
    pub fn new(
        source: Arc<S>,
        notifier: Arc<N>,
        decisions: Arc<D>,
        plans: Arc<P>,
        engine: ScoringEngine,
    ) -> Self {
        Self {
            source,
            notifier,
            decisions,
            plans,
            engine,
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Evaluate a borrower and persist the outcome.
    ///
    /// A transaction-source failure aborts the attempt before scoring; an
    /// empty (but successful) fetch is a legitimate no-history evaluation.
    /// For approvals the repayment plan is built and persisted, and the
    /// ledger is notified best-effort: a delivery failure is logged and
    /// counted but never propagated to the caller.
    pub async fn decide(
        &self,
        request: DecisionRequest,
    ) -> Result<DecisionRecord, DecisionServiceError> {
        validate_request(&request)?;

        info!(
            user = %request.user_id.0,
            amount_cents = request.amount_cents_requested,
            "decision requested"
        );

        let transactions = self.source.fetch_transactions(&request.user_id).await?;
        info!(user = %request.user_id.0, count = transactions.len(), "transactions fetched");

        let decision = self
            .engine
            .decide(&transactions, request.amount_cents_requested);
        let evaluated_on = request
            .evaluated_on
            .unwrap_or_else(|| Local::now().date_naive());

        let mut record = DecisionRecord {
            id: DecisionId::generate(),
            user_id: request.user_id.clone(),
            decision,
            plan_id: None,
            created_at: Utc::now(),
        };

        let plan = if record.decision.approved {
            let plan = build_plan(
                record.user_id.clone(),
                record.id,
                record.decision.amount_granted_cents,
                evaluated_on,
            );
            record.plan_id = Some(plan.id);
            Some(plan)
        } else {
            None
        };

        self.decisions.insert(record.clone())?;

        if let Some(plan) = plan {
            self.plans.insert(plan.clone())?;
            info!(
                plan = %plan.id.0,
                user = %record.user_id.0,
                total_cents = plan.total_cents,
                installments = plan.installments.len(),
                "plan created"
            );

            if let Err(err) = self.notifier.plan_created(&plan).await {
                warn!(plan = %plan.id.0, error = %err, "ledger notification failed");
            }
        }

        let outcome = outcome_label(record.decision.approved);
        metrics::counter!("decision_total", "outcome" => outcome).increment(1);
        metrics::counter!(
            "credit_limit_bucket",
            "bucket" => limit_bucket(record.decision.credit_limit_cents),
            "outcome" => outcome
        )
        .increment(1);

        info!(
            user = %record.user_id.0,
            approved = record.decision.approved,
            credit_limit_cents = record.decision.credit_limit_cents,
            amount_granted_cents = record.decision.amount_granted_cents,
            risk_score = record.decision.factors.risk_score,
            "decision made"
        );

        Ok(record)
    }

    /// Most recent decisions for a user, newest first.
    pub fn decision_history(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<DecisionRecord>, DecisionServiceError> {
        Ok(self.decisions.by_user(user_id, DEFAULT_HISTORY_LIMIT)?)
    }

    pub fn decision(&self, id: &DecisionId) -> Result<DecisionRecord, DecisionServiceError> {
        self.decisions
            .fetch(id)?
            .ok_or(DecisionServiceError::Repository(RepositoryError::NotFound))
    }

    pub fn plan(&self, id: &PlanId) -> Result<Plan, DecisionServiceError> {
        self.plans
            .fetch(id)?
            .ok_or(DecisionServiceError::Repository(RepositoryError::NotFound))
    }
}

fn validate_request(request: &DecisionRequest) -> Result<(), DecisionServiceError> {
    if request.user_id.0.trim().is_empty() {
        return Err(DecisionServiceError::InvalidRequest(
            "user_id must not be empty".to_string(),
        ));
    }
    if request.amount_cents_requested <= 0 {
        return Err(DecisionServiceError::InvalidRequest(
            "amount_cents_requested must be positive".to_string(),
        ));
    }
    Ok(())
}

fn outcome_label(approved: bool) -> &'static str {
    if approved {
        "approved"
    } else {
        "declined"
    }
}

/// Error raised by the decision service.
#[derive(Debug, thiserror::Error)]
pub enum DecisionServiceError {
    #[error("invalid decision request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Source(#[from] TransactionSourceError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
