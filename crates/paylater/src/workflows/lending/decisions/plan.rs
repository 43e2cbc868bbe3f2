use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

use super::domain::{DecisionId, Installment, InstallmentStatus, Plan, PlanId, UserId};

/// Number of equal repayments per plan.
pub const INSTALLMENT_COUNT: i64 = 4;

/// Days before the first due date and between consecutive due dates.
pub const INSTALLMENT_INTERVAL_DAYS: i64 = 14;

/// Split a granted amount into a biweekly repayment schedule.
///
/// Integer division sets the base amount and the remainder lands entirely on
/// the first installment, so the schedule always sums exactly to
/// `total_cents`. Due dates run 14, 28, 42, and 56 days after
/// `evaluated_on`; every installment starts out `Scheduled`.
pub fn build_plan(
    user_id: UserId,
    decision_id: DecisionId,
    total_cents: i64,
    evaluated_on: NaiveDate,
) -> Plan {
    let base = total_cents / INSTALLMENT_COUNT;
    let remainder = total_cents % INSTALLMENT_COUNT;

    let installments = (0..INSTALLMENT_COUNT)
        .map(|index| {
            let amount_cents = if index == 0 { base + remainder } else { base };
            Installment {
                id: Uuid::new_v4(),
                due_date: evaluated_on + Duration::days(INSTALLMENT_INTERVAL_DAYS * (index + 1)),
                amount_cents,
                status: InstallmentStatus::Scheduled,
            }
        })
        .collect();

    Plan {
        id: PlanId::generate(),
        user_id,
        decision_id,
        total_cents,
        installments,
        created_at: Utc::now(),
    }
}
