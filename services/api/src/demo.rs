use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use paylater::error::AppError;
use paylater::workflows::lending::decisions::{
    DecisionRequest, DecisionService, Transaction, TransactionKind, UserId,
};

use crate::infra::{
    parse_date, scoring_engine, CannedTransactionSource, InMemoryDecisionRepository,
    InMemoryPlanRepository, RecordingLedgerNotifier,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date anchoring the repayment schedules (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) evaluated_on: Option<NaiveDate>,
    /// Requested amount in cents for every archetype
    #[arg(long)]
    pub(crate) amount_cents: Option<i64>,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let evaluated_on = args.evaluated_on.unwrap_or_else(|| Local::now().date_naive());
    let amount_cents = args.amount_cents.unwrap_or(40_000);
    let window_start = evaluated_on - Duration::days(90);

    println!("Pay-later decision demo");
    println!("Evaluation date: {evaluated_on} | requested amount: {amount_cents} cents");

    let archetypes = [
        (
            "steady-payroll",
            "Biweekly payroll, modest spending, growing balance",
            steady_payroll_history(window_start),
        ),
        (
            "chronic-overdraft",
            "Spending outruns income, repeated NSF events",
            overdraft_history(window_start),
        ),
        (
            "thin-file",
            "Five clean transactions, not enough for standard scoring",
            thin_file_history(window_start),
        ),
    ];

    for (name, blurb, history) in archetypes {
        println!("\n=== {name}: {blurb} ===");
        run_archetype(name, history, amount_cents, evaluated_on).await;
    }

    Ok(())
}

async fn run_archetype(
    name: &str,
    history: Vec<Transaction>,
    amount_cents: i64,
    evaluated_on: NaiveDate,
) {
    let ledger = RecordingLedgerNotifier::default();
    let engine = match scoring_engine() {
        Ok(engine) => engine,
        Err(err) => {
            println!("  Scoring configuration rejected: {err}");
            return;
        }
    };
    println!(
        "  History classification: {}",
        engine.thin_file_reason(&history)
    );

    let service = Arc::new(DecisionService::new(
        Arc::new(CannedTransactionSource {
            transactions: history,
        }),
        Arc::new(ledger.clone()),
        Arc::new(InMemoryDecisionRepository::default()),
        Arc::new(InMemoryPlanRepository::default()),
        engine,
    ));

    let record = match service
        .decide(DecisionRequest {
            user_id: UserId(format!("demo-{name}")),
            amount_cents_requested: amount_cents,
            evaluated_on: Some(evaluated_on),
        })
        .await
    {
        Ok(record) => record,
        Err(err) => {
            println!("  Decision unavailable: {err}");
            return;
        }
    };

    for line in record.decision.explain().lines() {
        println!("  {line}");
    }

    if let Some(plan_id) = record.plan_id {
        match service.plan(&plan_id) {
            Ok(plan) => {
                println!("  Repayment schedule ({} cents total):", plan.total_cents);
                for installment in &plan.installments {
                    println!(
                        "    - {} cents due {} ({})",
                        installment.amount_cents,
                        installment.due_date,
                        installment.status.label()
                    );
                }
            }
            Err(err) => println!("  Plan lookup failed: {err}"),
        }
    }

    let events = ledger.events();
    if events.is_empty() {
        println!("  Ledger events: none dispatched");
    } else {
        println!("  Ledger events:");
        for event in events {
            println!("    - {event}");
        }
    }
}

fn line(
    date: NaiveDate,
    amount_cents: i64,
    balance_cents: i64,
    kind: TransactionKind,
    nsf: bool,
    description: &str,
) -> Transaction {
    Transaction {
        date,
        amount_cents,
        balance_cents,
        kind,
        nsf,
        description: description.to_string(),
    }
}

fn steady_payroll_history(window_start: NaiveDate) -> Vec<Transaction> {
    let mut transactions = Vec::new();
    let mut balance = 120_000i64;

    for offset in 0..90 {
        let date = window_start + Duration::days(offset);
        if offset % 14 == 0 {
            balance += 200_000;
            transactions.push(line(
                date,
                200_000,
                balance,
                TransactionKind::Credit,
                false,
                "Direct deposit",
            ));
        }
        if offset % 2 == 0 {
            balance -= 5_000;
            transactions.push(line(
                date,
                -5_000,
                balance,
                TransactionKind::Debit,
                false,
                "Card purchase",
            ));
        }
    }

    transactions
}

fn overdraft_history(window_start: NaiveDate) -> Vec<Transaction> {
    let mut transactions = Vec::new();
    let mut balance = -5_000i64;

    for offset in 0..90 {
        let date = window_start + Duration::days(offset);
        if offset % 30 == 15 {
            balance += 80_000;
            transactions.push(line(
                date,
                80_000,
                balance,
                TransactionKind::Credit,
                false,
                "Paycheck",
            ));
        }
        if offset % 5 == 0 {
            balance -= 15_000;
            transactions.push(line(
                date,
                -15_000,
                balance,
                TransactionKind::Debit,
                balance < 0,
                "Bill payment",
            ));
        }
    }

    transactions
}

fn thin_file_history(window_start: NaiveDate) -> Vec<Transaction> {
    [
        (0, 50_000, 50_000, TransactionKind::Credit),
        (5, -2_000, 48_000, TransactionKind::Debit),
        (10, -3_000, 45_000, TransactionKind::Debit),
        (15, 50_000, 95_000, TransactionKind::Credit),
        (20, -5_000, 90_000, TransactionKind::Debit),
    ]
    .into_iter()
    .map(|(offset, amount, balance, kind)| {
        line(
            window_start + Duration::days(offset),
            amount,
            balance,
            kind,
            false,
            "",
        )
    })
    .collect()
}
