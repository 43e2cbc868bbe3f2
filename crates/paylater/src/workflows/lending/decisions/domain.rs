use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier wrapper for a borrower as known to the bank aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identifier wrapper for a persisted credit decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecisionId(pub Uuid);

impl DecisionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Identifier wrapper for a repayment plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanId(pub Uuid);

impl PlanId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Direction of money movement on a statement line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Credit,
    Debit,
}

/// A single statement line from the borrower's 90-day bank history.
///
/// Amounts and balances are integer minor-currency units (cents); credits
/// carry positive amounts, debits negative ones. The record is owned by the
/// caller and read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub amount_cents: i64,
    pub balance_cents: i64,
    pub kind: TransactionKind,
    #[serde(default)]
    pub nsf: bool,
    #[serde(default)]
    pub description: String,
}

impl Transaction {
    pub fn is_credit(&self) -> bool {
        self.kind == TransactionKind::Credit
    }

    pub fn is_debit(&self) -> bool {
        self.kind == TransactionKind::Debit
    }
}

/// Monthly income relative to monthly spending.
///
/// A borrower with income and no spending has no meaningful finite ratio;
/// the dedicated variant keeps that case explicit instead of leaning on IEEE
/// infinity semantics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ratio {
    Finite(f64),
    Unbounded,
}

impl Ratio {
    /// Largest value exposed through the API when the ratio is unbounded.
    pub const DISPLAY_CAP: f64 = 999.99;

    pub fn display_value(self) -> f64 {
        match self {
            Ratio::Finite(value) => value,
            Ratio::Unbounded => Self::DISPLAY_CAP,
        }
    }

    pub fn is_unbounded(self) -> bool {
        matches!(self, Ratio::Unbounded)
    }

    /// True when the ratio clears `threshold`; unbounded clears every finite
    /// threshold.
    pub fn exceeds(self, threshold: f64) -> bool {
        match self {
            Ratio::Finite(value) => value > threshold,
            Ratio::Unbounded => true,
        }
    }
}

/// Risk factors attached to every decision so callers can audit the outcome.
///
/// `avg_daily_balance` is in whole currency units; `income_ratio` is the
/// display value (capped at [`Ratio::DISPLAY_CAP`] when unbounded).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionFactors {
    pub avg_daily_balance: f64,
    pub income_ratio: f64,
    pub nsf_count: u32,
    pub risk_score: u8,
}

impl DecisionFactors {
    /// Zero-valued factors for the no-history terminal decline.
    pub fn zeroed() -> Self {
        Self {
            avg_daily_balance: 0.0,
            income_ratio: 0.0,
            nsf_count: 0,
            risk_score: 0,
        }
    }
}

/// Outcome of one scoring pass over a statement window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub approved: bool,
    pub credit_limit_cents: i64,
    pub amount_requested_cents: i64,
    pub amount_granted_cents: i64,
    pub factors: DecisionFactors,
}

impl Decision {
    /// Human-readable account of the decision for logs, support tooling, and
    /// the CLI demo.
    pub fn explain(&self) -> String {
        let factors = &self.factors;
        let mut lines = Vec::new();

        if self.approved {
            lines.push(format!(
                "Decision: APPROVED (${:.0} limit)",
                self.credit_limit_cents as f64 / 100.0
            ));
        } else {
            lines.push("Decision: DECLINED".to_string());
        }

        lines.push(format!("Risk score: {}/100", factors.risk_score));
        lines.push("Contributing factors:".to_string());

        let balance_note = if factors.avg_daily_balance < 0.0 {
            "negative, high risk"
        } else if factors.avg_daily_balance < 100.0 {
            "low cushion"
        } else if factors.avg_daily_balance < 500.0 {
            "moderate cushion"
        } else {
            "healthy cushion"
        };
        lines.push(format!(
            "  - average balance ${:.2} ({balance_note})",
            factors.avg_daily_balance
        ));

        let ratio_note = if factors.income_ratio < 0.8 {
            "spending exceeds income"
        } else if factors.income_ratio < 1.0 {
            "near break-even"
        } else if factors.income_ratio < 1.3 {
            "sustainable"
        } else {
            "healthy margin"
        };
        lines.push(format!(
            "  - income/spend ratio {:.2} ({ratio_note})",
            factors.income_ratio
        ));

        let nsf_note = if factors.nsf_count == 0 {
            "excellent"
        } else if factors.nsf_count <= 2 {
            "minor concern"
        } else {
            "significant concern"
        };
        lines.push(format!("  - NSF events {} ({nsf_note})", factors.nsf_count));

        lines.join("\n")
    }
}

/// A persisted credit decision. Immutable once stored; the plan id is
/// attached before insertion when a plan was built for an approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub id: DecisionId,
    pub user_id: UserId,
    pub decision: Decision,
    pub plan_id: Option<PlanId>,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle of a single scheduled repayment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    Scheduled,
    Paid,
    Failed,
    Cancelled,
}

impl InstallmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            InstallmentStatus::Scheduled => "scheduled",
            InstallmentStatus::Paid => "paid",
            InstallmentStatus::Failed => "failed",
            InstallmentStatus::Cancelled => "cancelled",
        }
    }
}

/// One scheduled payment within a repayment plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    pub id: Uuid,
    pub due_date: NaiveDate,
    pub amount_cents: i64,
    pub status: InstallmentStatus,
}

/// A repayment plan covering the granted amount of an approved decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub user_id: UserId,
    pub decision_id: DecisionId,
    pub total_cents: i64,
    pub installments: Vec<Installment>,
    pub created_at: DateTime<Utc>,
}
