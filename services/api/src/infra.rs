use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use paylater::workflows::lending::decisions::{
    DecisionId, DecisionRecord, DecisionRepository, LedgerNotifier, NotifyError, Plan, PlanId,
    PlanRepository, RepositoryError, ScoringConfig, ScoringEngine, Transaction, TransactionSource,
    TransactionSourceError, UserId,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn scoring_engine() -> Result<ScoringEngine, paylater::error::AppError> {
    ScoringEngine::new(ScoringConfig::default()).map_err(paylater::error::AppError::from)
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryDecisionRepository {
    records: Arc<Mutex<Vec<DecisionRecord>>>,
}

impl DecisionRepository for InMemoryDecisionRepository {
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
pub(crate) struct InMemoryPlanRepository {
    records: Arc<Mutex<Vec<Plan>>>,
}

impl PlanRepository for InMemoryPlanRepository {
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

/// Demo-only source serving a canned history instead of calling the bank.
#[derive(Default, Clone)]
pub(crate) struct CannedTransactionSource {
    pub(crate) transactions: Vec<Transaction>,
}

#[async_trait]
impl TransactionSource for CannedTransactionSource {
    async fn fetch_transactions(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<Transaction>, TransactionSourceError> {
        Ok(self.transactions.clone())
    }
}

/// Demo-only notifier collecting dispatched events for the printed summary.
#[derive(Default, Clone)]
pub(crate) struct RecordingLedgerNotifier {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingLedgerNotifier {
    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().expect("ledger mutex poisoned").clone()
    }
}

#[async_trait]
impl LedgerNotifier for RecordingLedgerNotifier {
    async fn plan_created(&self, plan: &Plan) -> Result<(), NotifyError> {
        self.events
            .lock()
            .expect("ledger mutex poisoned")
            .push(format!("plan_created -> {}", plan.id.0));
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
