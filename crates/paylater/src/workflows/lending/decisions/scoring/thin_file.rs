use std::collections::BTreeSet;

use super::super::domain::Transaction;
use super::config::ScoringConfig;
use super::factors;

/// Binary outcome of the starter-limit policy for thin-file borrowers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ThinFileOutcome {
    pub approved: bool,
    pub limit_cents: i64,
}

/// A file is thin when the borrower has too few transactions or too few
/// distinct transaction days for standard scoring to be reliable.
pub(crate) fn is_thin_file(transactions: &[Transaction], config: &ScoringConfig) -> bool {
    if transactions.len() < config.min_transactions {
        return true;
    }
    distinct_days(transactions) < config.min_history_days
}

/// Apply the starter-limit policy. Returns `None` for borrowers with enough
/// history, handing them to the standard scoring path.
///
/// Any NSF event in a thin file declines outright; a clean thin file is
/// approved at the configured starter limit without consulting the scorer.
pub(crate) fn thin_file_outcome(
    transactions: &[Transaction],
    config: &ScoringConfig,
) -> Option<ThinFileOutcome> {
    if !is_thin_file(transactions, config) {
        return None;
    }

    if factors::nsf_event_count(transactions) > 0 {
        return Some(ThinFileOutcome {
            approved: false,
            limit_cents: 0,
        });
    }

    Some(ThinFileOutcome {
        approved: true,
        limit_cents: config.thin_file_limit_cents,
    })
}

/// Classification note for logs and the CLI demo.
pub(crate) fn thin_file_reason(transactions: &[Transaction], config: &ScoringConfig) -> String {
    if transactions.len() < config.min_transactions {
        return format!(
            "insufficient transactions ({} < {})",
            transactions.len(),
            config.min_transactions
        );
    }

    let days = distinct_days(transactions);
    if days < config.min_history_days {
        return format!(
            "insufficient history ({days} days < {} days)",
            config.min_history_days
        );
    }

    "standard history".to_string()
}

fn distinct_days(transactions: &[Transaction]) -> usize {
    transactions
        .iter()
        .map(|txn| txn.date)
        .collect::<BTreeSet<_>>()
        .len()
}
