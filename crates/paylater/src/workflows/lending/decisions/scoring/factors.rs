use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};

use super::super::domain::{Ratio, Transaction};

/// Length of the statement window the engine reasons over.
pub(crate) const WINDOW_DAYS: i64 = 90;

const NEUTRAL_CONSISTENCY: f64 = 0.5;

/// Raw signals derived from the statement window, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RiskSignals {
    pub avg_daily_balance: f64,
    pub income_ratio: Ratio,
    pub nsf_count: u32,
    pub income_consistency: f64,
}

/// The balance average is undefined without at least one statement line;
/// callers must special-case the no-history evaluation before asking for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot average a balance over an empty statement window")]
pub struct EmptyHistory;

/// Mean end-of-day balance across a 90-day window anchored at the earliest
/// transaction date, in whole currency units.
///
/// Days without a transaction carry the most recent known balance forward
/// (zero before the first line). The last transaction of a date wins.
pub fn average_daily_balance(transactions: &[Transaction]) -> Result<f64, EmptyHistory> {
    let mut end_of_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for txn in sorted_by_date(transactions) {
        end_of_day.insert(txn.date, txn.balance_cents);
    }

    let start = match end_of_day.keys().next() {
        Some(date) => *date,
        None => return Err(EmptyHistory),
    };

    let mut total_cents: i64 = 0;
    let mut carried = 0i64;
    for offset in 0..WINDOW_DAYS {
        let day = start + Duration::days(offset);
        if let Some(balance) = end_of_day.get(&day) {
            carried = *balance;
        }
        total_cents += carried;
    }

    Ok(total_cents as f64 / (WINDOW_DAYS as f64 * 100.0))
}

/// Monthly income over monthly spending, approximating the 90-day window as
/// three months.
///
/// No spending yields [`Ratio::Unbounded`] when any income exists; an empty
/// window or one with neither income nor spending is neutral (1.0). No
/// income with spending is exactly 0.
pub fn income_spend_ratio(transactions: &[Transaction]) -> Ratio {
    if transactions.is_empty() {
        return Ratio::Finite(1.0);
    }

    let total_credits: i64 = transactions
        .iter()
        .filter(|txn| txn.is_credit())
        .map(|txn| txn.amount_cents)
        .sum();
    let total_debits: i64 = transactions
        .iter()
        .filter(|txn| txn.is_debit())
        .map(|txn| txn.amount_cents)
        .sum::<i64>()
        .abs();

    if total_debits == 0 {
        return if total_credits > 0 {
            Ratio::Unbounded
        } else {
            Ratio::Finite(1.0)
        };
    }

    let monthly_income = total_credits as f64 / 3.0;
    let monthly_spending = total_debits as f64 / 3.0;
    Ratio::Finite(monthly_income / monthly_spending)
}

/// Count NSF events in chronological order.
///
/// An event is either an explicitly flagged line or a debit that drives the
/// balance negative while the previous balance was non-negative. Only the
/// crossing counts; subsequent negative-balance debits are the same episode.
/// A line matching both conditions counts once.
pub fn nsf_event_count(transactions: &[Transaction]) -> u32 {
    let mut count = 0;
    let mut prev_balance = 0i64;

    for txn in sorted_by_date(transactions) {
        if txn.nsf {
            count += 1;
        } else if txn.is_debit() && txn.balance_cents < 0 && prev_balance >= 0 {
            count += 1;
        }
        prev_balance = txn.balance_cents;
    }

    count
}

/// How regular the borrower's income is, from 0.0 (highly irregular) to 1.0
/// (perfectly regular).
///
/// Credits are grouped by ISO calendar week and the population coefficient
/// of variation of the weekly sums is mapped to `clamp(1 - cv, 0, 1)`. With
/// fewer than 3 credits, fewer than 4 distinct weeks, or a non-positive mean
/// the signal is a neutral 0.5.
pub fn income_consistency(transactions: &[Transaction]) -> f64 {
    let credits: Vec<&Transaction> = transactions.iter().filter(|txn| txn.is_credit()).collect();
    if credits.len() < 3 {
        return NEUTRAL_CONSISTENCY;
    }

    let mut weekly_income: BTreeMap<(i32, u32), i64> = BTreeMap::new();
    for txn in credits {
        let week = txn.date.iso_week();
        *weekly_income.entry((week.year(), week.week())).or_insert(0) += txn.amount_cents;
    }

    if weekly_income.len() < 4 {
        return NEUTRAL_CONSISTENCY;
    }

    let values: Vec<f64> = weekly_income.values().map(|cents| *cents as f64).collect();
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if mean <= 0.0 {
        return NEUTRAL_CONSISTENCY;
    }

    let variance = values.iter().map(|value| (value - mean).powi(2)).sum::<f64>()
        / values.len() as f64;
    let cv = variance.sqrt() / mean;

    (1.0 - cv).clamp(0.0, 1.0)
}

/// Stable chronological ordering; same-date lines keep their input order so
/// the last reported line of a day wins downstream.
fn sorted_by_date(transactions: &[Transaction]) -> Vec<&Transaction> {
    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by_key(|txn| txn.date);
    ordered
}
