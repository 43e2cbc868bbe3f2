use super::common::*;
use crate::workflows::lending::decisions::domain::{Ratio, TransactionKind};
use crate::workflows::lending::decisions::scoring::{
    average_daily_balance, income_consistency, income_spend_ratio, nsf_event_count, EmptyHistory,
};

#[test]
fn single_transaction_balance_carries_across_the_window() {
    let history = vec![txn(day(0), 54_321, 54_321, TransactionKind::Credit)];

    let adb = average_daily_balance(&history).expect("non-empty history");

    assert!((adb - 543.21).abs() < 1e-9);
}

#[test]
fn balance_carries_forward_over_quiet_days() {
    let history = vec![
        txn(day(0), 10_000, 10_000, TransactionKind::Credit),
        txn(day(45), 10_000, 20_000, TransactionKind::Credit),
    ];

    let adb = average_daily_balance(&history).expect("non-empty history");

    // 45 days at $100 followed by 45 days at $200.
    assert!((adb - 150.0).abs() < 1e-9);
}

#[test]
fn last_transaction_of_a_day_sets_its_balance() {
    let history = vec![
        txn(day(0), 10_000, 10_000, TransactionKind::Credit),
        txn(day(0), -4_000, 6_000, TransactionKind::Debit),
    ];

    let adb = average_daily_balance(&history).expect("non-empty history");

    assert!((adb - 60.0).abs() < 1e-9);
}

#[test]
fn balance_average_rejects_empty_history() {
    assert_eq!(average_daily_balance(&[]), Err(EmptyHistory));
}

#[test]
fn ratio_is_unbounded_with_income_and_no_spending() {
    let history = vec![
        txn(day(0), 50_000, 50_000, TransactionKind::Credit),
        txn(day(7), 50_000, 100_000, TransactionKind::Credit),
    ];

    assert_eq!(income_spend_ratio(&history), Ratio::Unbounded);
}

#[test]
fn ratio_is_zero_without_income() {
    let history = vec![
        txn(day(0), -10_000, -10_000, TransactionKind::Debit),
        txn(day(7), -5_000, -15_000, TransactionKind::Debit),
    ];

    assert_eq!(income_spend_ratio(&history), Ratio::Finite(0.0));
}

#[test]
fn ratio_is_neutral_for_empty_history() {
    assert_eq!(income_spend_ratio(&[]), Ratio::Finite(1.0));
}

#[test]
fn ratio_divides_monthly_income_by_monthly_spending() {
    let history = vec![
        txn(day(0), 300_000, 300_000, TransactionKind::Credit),
        txn(day(10), -150_000, 150_000, TransactionKind::Debit),
    ];

    assert_eq!(income_spend_ratio(&history), Ratio::Finite(2.0));
}

#[test]
fn nsf_counts_the_crossing_but_not_the_slide() {
    let history = vec![
        txn(day(0), 5_000, 5_000, TransactionKind::Credit),
        txn(day(1), -6_000, -1_000, TransactionKind::Debit), // crossing
        txn(day(2), -2_000, -3_000, TransactionKind::Debit), // still negative, same episode
        txn(day(3), 10_000, 7_000, TransactionKind::Credit),
        txn(day(4), -9_000, -2_000, TransactionKind::Debit), // new crossing
    ];

    assert_eq!(nsf_event_count(&history), 2);
}

#[test]
fn nsf_flagged_transaction_counts_once_even_when_it_crosses() {
    let mut crossing = txn(day(1), -6_000, -1_000, TransactionKind::Debit);
    crossing.nsf = true;
    let history = vec![txn(day(0), 5_000, 5_000, TransactionKind::Credit), crossing];

    assert_eq!(nsf_event_count(&history), 1);
}

#[test]
fn nsf_count_is_at_least_the_explicit_flag_count() {
    let history = overdraft_history();
    let flagged = history.iter().filter(|txn| txn.nsf).count() as u32;

    assert!(flagged > 0);
    assert!(nsf_event_count(&history) >= flagged);
}

#[test]
fn consistency_is_neutral_with_fewer_than_three_credits() {
    let history = vec![
        txn(day(0), 50_000, 50_000, TransactionKind::Credit),
        txn(day(7), 50_000, 100_000, TransactionKind::Credit),
    ];

    assert_eq!(income_consistency(&history), 0.5);
}

#[test]
fn consistency_is_neutral_with_fewer_than_four_weeks() {
    let history = vec![
        txn(day(0), 50_000, 50_000, TransactionKind::Credit),
        txn(day(1), 50_000, 100_000, TransactionKind::Credit),
        txn(day(2), 50_000, 150_000, TransactionKind::Credit),
        txn(day(7), 50_000, 200_000, TransactionKind::Credit),
    ];

    assert_eq!(income_consistency(&history), 0.5);
}

#[test]
fn equal_weekly_income_is_perfectly_consistent() {
    let history = vec![
        txn(day(0), 50_000, 50_000, TransactionKind::Credit),
        txn(day(7), 50_000, 100_000, TransactionKind::Credit),
        txn(day(14), 50_000, 150_000, TransactionKind::Credit),
        txn(day(21), 50_000, 200_000, TransactionKind::Credit),
    ];

    assert_eq!(income_consistency(&history), 1.0);
}

#[test]
fn volatile_weekly_income_scores_low() {
    let history = vec![
        txn(day(0), 5_000, 5_000, TransactionKind::Credit),
        txn(day(7), 200_000, 205_000, TransactionKind::Credit),
        txn(day(14), 2_000, 207_000, TransactionKind::Credit),
        txn(day(21), 150_000, 357_000, TransactionKind::Credit),
        txn(day(28), 1_000, 358_000, TransactionKind::Credit),
    ];

    let consistency = income_consistency(&history);
    assert!(consistency < 0.5, "got {consistency}");
}
