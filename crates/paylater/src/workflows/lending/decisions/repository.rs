use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::domain::{
    DecisionFactors, DecisionId, DecisionRecord, Installment, Plan, PlanId, UserId,
};

/// Storage seam for decisions so the service can be exercised in isolation.
pub trait DecisionRepository: Send + Sync {
    fn insert(&self, record: DecisionRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &DecisionId) -> Result<Option<DecisionRecord>, RepositoryError>;
    fn by_user(&self, user_id: &UserId, limit: usize)
        -> Result<Vec<DecisionRecord>, RepositoryError>;
}

/// Storage seam for repayment plans.
pub trait PlanRepository: Send + Sync {
    fn insert(&self, plan: Plan) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &PlanId) -> Result<Option<Plan>, RepositoryError>;
    fn by_user(&self, user_id: &UserId) -> Result<Vec<Plan>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Serialized representation of a decision for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionView {
    pub decision_id: DecisionId,
    pub user_id: UserId,
    pub approved: bool,
    pub credit_limit_cents: i64,
    pub amount_requested_cents: i64,
    pub amount_granted_cents: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<PlanId>,
    pub decision_factors: DecisionFactors,
    pub created_at: DateTime<Utc>,
}

impl DecisionRecord {
    pub fn view(&self) -> DecisionView {
        DecisionView {
            decision_id: self.id,
            user_id: self.user_id.clone(),
            approved: self.decision.approved,
            credit_limit_cents: self.decision.credit_limit_cents,
            amount_requested_cents: self.decision.amount_requested_cents,
            amount_granted_cents: self.decision.amount_granted_cents,
            plan_id: self.plan_id,
            decision_factors: self.decision.factors.clone(),
            created_at: self.created_at,
        }
    }
}

/// Serialized representation of a plan for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct PlanView {
    pub plan_id: PlanId,
    pub user_id: UserId,
    pub decision_id: DecisionId,
    pub total_cents: i64,
    pub installments: Vec<InstallmentView>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstallmentView {
    pub installment_id: uuid::Uuid,
    pub due_date: NaiveDate,
    pub amount_cents: i64,
    pub status: &'static str,
}

impl Plan {
    pub fn view(&self) -> PlanView {
        PlanView {
            plan_id: self.id,
            user_id: self.user_id.clone(),
            decision_id: self.decision_id,
            total_cents: self.total_cents,
            installments: self.installments.iter().map(Installment::view).collect(),
            created_at: self.created_at,
        }
    }
}

impl Installment {
    pub fn view(&self) -> InstallmentView {
        InstallmentView {
            installment_id: self.id,
            due_date: self.due_date,
            amount_cents: self.amount_cents,
            status: self.status.label(),
        }
    }
}
