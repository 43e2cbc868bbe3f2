mod config;
mod factors;
mod limits;
mod score;
mod thin_file;

pub use config::{CreditTier, ScoringConfig, ScoringConfigError};
pub use factors::{
    average_daily_balance, income_consistency, income_spend_ratio, nsf_event_count, EmptyHistory,
};
pub use limits::limit_bucket;

use super::domain::{Decision, DecisionFactors, Transaction};

/// Score reported for thin-file approvals. No composite is computed for
/// them, so the lowest approvable score stands in.
const THIN_FILE_APPROVED_SCORE: u8 = 30;

/// Stateless decision engine applying the configured policy to a borrower's
/// 90-day statement window.
///
/// The engine holds an immutable, validated [`ScoringConfig`] and performs
/// no I/O; it is safe to share across request handlers without coordination.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    /// Build an engine, rejecting malformed tier tables, weights, and
    /// breakpoints before any request is served.
    pub fn new(config: ScoringConfig) -> Result<Self, ScoringConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Produce the approval decision for a requested amount.
    ///
    /// No history is a terminal decline with zeroed factors. Thin files go
    /// through the binary starter-limit policy, with factors still computed
    /// for transparency. Everyone else gets the standard weighted score and
    /// tier lookup. In every branch the granted amount is
    /// `min(requested, limit)` when approved and 0 otherwise.
    pub fn decide(&self, transactions: &[Transaction], amount_requested_cents: i64) -> Decision {
        if transactions.is_empty() {
            return Decision {
                approved: false,
                credit_limit_cents: 0,
                amount_requested_cents,
                amount_granted_cents: 0,
                factors: DecisionFactors::zeroed(),
            };
        }

        if let Some(outcome) = thin_file::thin_file_outcome(transactions, &self.config) {
            let amount_granted_cents = if outcome.approved {
                amount_requested_cents.min(outcome.limit_cents)
            } else {
                0
            };
            let risk_score = if outcome.approved {
                THIN_FILE_APPROVED_SCORE
            } else {
                0
            };

            return Decision {
                approved: outcome.approved,
                credit_limit_cents: outcome.limit_cents,
                amount_requested_cents,
                amount_granted_cents,
                factors: self.factors(transactions, risk_score),
            };
        }

        let signals = self.signals(transactions);
        let risk_score = score::composite_score(&signals, &self.config);
        let credit_limit_cents = limits::limit_for_score(risk_score, &self.config);
        let approved = credit_limit_cents > 0;
        let amount_granted_cents = if approved {
            amount_requested_cents.min(credit_limit_cents)
        } else {
            0
        };

        Decision {
            approved,
            credit_limit_cents,
            amount_requested_cents,
            amount_granted_cents,
            factors: DecisionFactors {
                avg_daily_balance: round2(signals.avg_daily_balance),
                income_ratio: round2(signals.income_ratio.display_value()),
                nsf_count: signals.nsf_count,
                risk_score,
            },
        }
    }

    /// True when the borrower falls under the starter-limit policy.
    pub fn is_thin_file(&self, transactions: &[Transaction]) -> bool {
        thin_file::is_thin_file(transactions, &self.config)
    }

    /// Why a history classifies as thin (or that it doesn't).
    pub fn thin_file_reason(&self, transactions: &[Transaction]) -> String {
        thin_file::thin_file_reason(transactions, &self.config)
    }

    fn signals(&self, transactions: &[Transaction]) -> factors::RiskSignals {
        // The empty case is handled before this point, so the balance
        // average cannot actually fail here.
        let avg_daily_balance = match factors::average_daily_balance(transactions) {
            Ok(value) => value,
            Err(EmptyHistory) => 0.0,
        };

        factors::RiskSignals {
            avg_daily_balance,
            income_ratio: factors::income_spend_ratio(transactions),
            nsf_count: factors::nsf_event_count(transactions),
            income_consistency: factors::income_consistency(transactions),
        }
    }

    fn factors(&self, transactions: &[Transaction], risk_score: u8) -> DecisionFactors {
        let signals = self.signals(transactions);
        DecisionFactors {
            avg_daily_balance: round2(signals.avg_daily_balance),
            income_ratio: round2(signals.income_ratio.display_value()),
            nsf_count: signals.nsf_count,
            risk_score,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
