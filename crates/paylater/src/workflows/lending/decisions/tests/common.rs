use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{Duration, NaiveDate};
use serde_json::Value;

use crate::workflows::lending::decisions::clients::{
    LedgerNotifier, NotifyError, TransactionSource, TransactionSourceError,
};
use crate::workflows::lending::decisions::domain::{
    DecisionId, DecisionRecord, Plan, PlanId, Transaction, TransactionKind, UserId,
};
use crate::workflows::lending::decisions::repository::{
    DecisionRepository, PlanRepository, RepositoryError,
};
use crate::workflows::lending::decisions::scoring::{ScoringConfig, ScoringEngine};
use crate::workflows::lending::decisions::service::DecisionService;

/// Fixed anchor (a Monday) so fixtures and assertions stay deterministic.
pub(super) fn day(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 6).expect("valid anchor date") + Duration::days(offset)
}

pub(super) fn txn(
    date: NaiveDate,
    amount_cents: i64,
    balance_cents: i64,
    kind: TransactionKind,
) -> Transaction {
    Transaction {
        date,
        amount_cents,
        balance_cents,
        kind,
        nsf: false,
        description: String::new(),
    }
}

pub(super) fn engine() -> ScoringEngine {
    ScoringEngine::new(ScoringConfig::default()).expect("default config validates")
}

/// Borrower with biweekly payroll, modest card spend, and a growing balance.
pub(super) fn steady_payroll_history() -> Vec<Transaction> {
    let mut transactions = Vec::new();
    let mut balance = 120_000i64;

    for offset in 0..90 {
        let date = day(offset);
        if offset % 14 == 0 {
            balance += 200_000;
            let mut deposit = txn(date, 200_000, balance, TransactionKind::Credit);
            deposit.description = "Direct deposit".to_string();
            transactions.push(deposit);
        }
        if offset % 2 == 0 {
            balance -= 5_000;
            let mut purchase = txn(date, -5_000, balance, TransactionKind::Debit);
            purchase.description = "Card purchase".to_string();
            transactions.push(purchase);
        }
    }

    transactions
}

/// Borrower who starts overdrawn, earns less than they spend, and racks up
/// NSF events.
pub(super) fn overdraft_history() -> Vec<Transaction> {
    let mut transactions = Vec::new();
    let mut balance = -5_000i64;

    for offset in 0..90 {
        let date = day(offset);
        if offset % 30 == 15 {
            balance += 80_000;
            transactions.push(txn(date, 80_000, balance, TransactionKind::Credit));
        }
        if offset % 5 == 0 {
            balance -= 15_000;
            let mut debit = txn(date, -15_000, balance, TransactionKind::Debit);
            debit.nsf = balance < 0;
            transactions.push(debit);
        }
    }

    transactions
}

/// Five clean transactions: far too few for standard scoring.
pub(super) fn thin_file_history() -> Vec<Transaction> {
    vec![
        txn(day(0), 50_000, 50_000, TransactionKind::Credit),
        txn(day(5), -2_000, 48_000, TransactionKind::Debit),
        txn(day(10), -3_000, 45_000, TransactionKind::Debit),
        txn(day(15), 50_000, 95_000, TransactionKind::Credit),
        txn(day(20), -5_000, 90_000, TransactionKind::Debit),
    ]
}

/// Thin file whose last debit overdraws the account.
pub(super) fn thin_file_with_overdraft() -> Vec<Transaction> {
    let mut transactions = thin_file_history();
    transactions.push(txn(day(22), -100_000, -10_000, TransactionKind::Debit));
    transactions
}

pub(super) fn user() -> UserId {
    UserId("user-123".to_string())
}

#[derive(Default, Clone)]
pub(super) struct StaticSource {
    pub(super) transactions: Vec<Transaction>,
}

#[async_trait]
impl TransactionSource for StaticSource {
    async fn fetch_transactions(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<Transaction>, TransactionSourceError> {
        Ok(self.transactions.clone())
    }
}

#[derive(Debug, Clone, Copy)]
pub(super) enum SourceFailure {
    NotFound,
    Timeout,
    Upstream,
}

pub(super) struct FailingSource(pub(super) SourceFailure);

#[async_trait]
impl TransactionSource for FailingSource {
    async fn fetch_transactions(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Transaction>, TransactionSourceError> {
        match self.0 {
            SourceFailure::NotFound => {
                Err(TransactionSourceError::UserNotFound(user_id.0.clone()))
            }
            SourceFailure::Timeout => Err(TransactionSourceError::Timeout),
            SourceFailure::Upstream => Err(TransactionSourceError::Upstream {
                status: Some(500),
                message: "bank api unavailable".to_string(),
            }),
        }
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryLedger {
    events: Arc<Mutex<Vec<PlanId>>>,
}

impl MemoryLedger {
    pub(super) fn notified_plans(&self) -> Vec<PlanId> {
        self.events.lock().expect("ledger mutex poisoned").clone()
    }
}

#[async_trait]
impl LedgerNotifier for MemoryLedger {
    async fn plan_created(&self, plan: &Plan) -> Result<(), NotifyError> {
        self.events
            .lock()
            .expect("ledger mutex poisoned")
            .push(plan.id);
        Ok(())
    }
}

pub(super) struct FailingLedger;

#[async_trait]
impl LedgerNotifier for FailingLedger {
    async fn plan_created(&self, _plan: &Plan) -> Result<(), NotifyError> {
        Err(NotifyError::RetriesExhausted { attempts: 5 })
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryDecisions {
    records: Arc<Mutex<Vec<DecisionRecord>>>,
}

impl MemoryDecisions {
    pub(super) fn all(&self) -> Vec<DecisionRecord> {
        self.records.lock().expect("repository mutex poisoned").clone()
    }
}

impl DecisionRepository for MemoryDecisions {
    fn insert(&self, record: DecisionRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record);
        Ok(())
    }

    fn fetch(&self, id: &DecisionId) -> Result<Option<DecisionRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| record.id == *id).cloned())
    }

    fn by_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<DecisionRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut matches: Vec<DecisionRecord> = guard
            .iter()
            .filter(|record| record.user_id == *user_id)
            .cloned()
            .collect();
        matches.reverse();
        matches.truncate(limit);
        Ok(matches)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryPlans {
    records: Arc<Mutex<Vec<Plan>>>,
}

impl MemoryPlans {
    pub(super) fn all(&self) -> Vec<Plan> {
        self.records.lock().expect("repository mutex poisoned").clone()
    }
}

impl PlanRepository for MemoryPlans {
    fn insert(&self, plan: Plan) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == plan.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(plan);
        Ok(())
    }

    fn fetch(&self, id: &PlanId) -> Result<Option<Plan>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|plan| plan.id == *id).cloned())
    }

    fn by_user(&self, user_id: &UserId) -> Result<Vec<Plan>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .filter(|plan| plan.user_id == *user_id)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableDecisions;

impl DecisionRepository for UnavailableDecisions {
    fn insert(&self, _record: DecisionRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &DecisionId) -> Result<Option<DecisionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn by_user(
        &self,
        _user_id: &UserId,
        _limit: usize,
    ) -> Result<Vec<DecisionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) type MemoryService =
    DecisionService<StaticSource, MemoryLedger, MemoryDecisions, MemoryPlans>;

pub(super) fn build_service(
    transactions: Vec<Transaction>,
) -> (MemoryService, MemoryDecisions, MemoryPlans, MemoryLedger) {
    let decisions = MemoryDecisions::default();
    let plans = MemoryPlans::default();
    let ledger = MemoryLedger::default();
    let service = DecisionService::new(
        Arc::new(StaticSource { transactions }),
        Arc::new(ledger.clone()),
        Arc::new(decisions.clone()),
        Arc::new(plans.clone()),
        engine(),
    );
    (service, decisions, plans, ledger)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
