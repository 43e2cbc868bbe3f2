use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::config::{BankApiConfig, LedgerWebhookConfig};

use super::super::domain::{Plan, Transaction, TransactionKind, UserId};
use super::{LedgerNotifier, NotifyError, TransactionSource, TransactionSourceError};

/// HTTP client for the bank aggregation API.
///
/// Retries with exponential backoff on timeouts and transport errors only; a
/// 404 or any other HTTP error status is a definitive upstream answer and
/// fails immediately.
pub struct HttpTransactionSource {
    base_url: String,
    max_retries: u32,
    client: reqwest::Client,
}

impl HttpTransactionSource {
    pub fn new(config: &BankApiConfig) -> Result<Self, TransactionSourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs_f64(config.timeout_seconds))
            .build()
            .map_err(|err| TransactionSourceError::Upstream {
                status: None,
                message: err.to_string(),
            })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries.max(1),
            client,
        })
    }
}

#[async_trait]
impl TransactionSource for HttpTransactionSource {
    async fn fetch_transactions(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Transaction>, TransactionSourceError> {
        let url = format!("{}/bank/transactions", self.base_url);
        let mut last_error = TransactionSourceError::Timeout;

        for attempt in 0..self.max_retries {
            let response = self
                .client
                .get(&url)
                .query(&[("user_id", user_id.0.as_str())])
                .send()
                .await;

            match response {
                Ok(response) => {
                    let status = response.status();
                    if status == reqwest::StatusCode::NOT_FOUND {
                        metrics::counter!("bank_fetch_failures_total", "error_type" => "not_found")
                            .increment(1);
                        return Err(TransactionSourceError::UserNotFound(user_id.0.clone()));
                    }
                    if status.as_u16() >= 400 {
                        metrics::counter!("bank_fetch_failures_total", "error_type" => "error")
                            .increment(1);
                        let message = response.text().await.unwrap_or_default();
                        return Err(TransactionSourceError::Upstream {
                            status: Some(status.as_u16()),
                            message,
                        });
                    }

                    let page: TransactionPage =
                        response
                            .json()
                            .await
                            .map_err(|err| TransactionSourceError::Upstream {
                                status: None,
                                message: format!("malformed transaction payload: {err}"),
                            })?;
                    metrics::counter!("bank_fetch_total", "status" => "success").increment(1);
                    return page.into_transactions();
                }
                Err(err) if err.is_timeout() => {
                    metrics::counter!("bank_fetch_failures_total", "error_type" => "timeout")
                        .increment(1);
                    warn!(
                        user = %user_id.0,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        "bank api timed out"
                    );
                    last_error = TransactionSourceError::Timeout;
                }
                Err(err) => {
                    metrics::counter!("bank_fetch_failures_total", "error_type" => "error")
                        .increment(1);
                    warn!(
                        user = %user_id.0,
                        attempt = attempt + 1,
                        error = %err,
                        "bank api request failed"
                    );
                    last_error = TransactionSourceError::Upstream {
                        status: None,
                        message: err.to_string(),
                    };
                }
            }

            if attempt + 1 < self.max_retries {
                tokio::time::sleep(backoff_delay(attempt)).await;
            }
        }

        Err(last_error)
    }
}

/// Page shape returned by the bank API.
#[derive(Debug, Deserialize)]
struct TransactionPage {
    #[serde(default)]
    transactions: Vec<WireTransaction>,
}

/// One statement line as the bank reports it. Some providers send dollar
/// floats and omit the kind, so the shape is deliberately lenient.
#[derive(Debug, Deserialize)]
struct WireTransaction {
    date: String,
    #[serde(default)]
    amount_cents: Option<i64>,
    #[serde(default)]
    amount: Option<f64>,
    #[serde(default)]
    balance_cents: Option<i64>,
    #[serde(default)]
    balance: Option<f64>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    nsf: bool,
    #[serde(default)]
    description: String,
}

impl TransactionPage {
    fn into_transactions(self) -> Result<Vec<Transaction>, TransactionSourceError> {
        self.transactions
            .into_iter()
            .map(WireTransaction::into_domain)
            .collect()
    }
}

impl WireTransaction {
    fn into_domain(self) -> Result<Transaction, TransactionSourceError> {
        let date = parse_wire_date(&self.date)?;

        let amount_cents = self
            .amount_cents
            .or_else(|| self.amount.map(dollars_to_cents))
            .unwrap_or(0);
        let balance_cents = self
            .balance_cents
            .or_else(|| self.balance.map(dollars_to_cents))
            .unwrap_or(0);

        let kind = match self.kind.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("credit") => TransactionKind::Credit,
            Some("debit") => TransactionKind::Debit,
            _ if amount_cents > 0 => TransactionKind::Credit,
            _ => TransactionKind::Debit,
        };

        Ok(Transaction {
            date,
            amount_cents,
            balance_cents,
            kind,
            nsf: self.nsf,
            description: self.description,
        })
    }
}

fn dollars_to_cents(dollars: f64) -> i64 {
    (dollars * 100.0).round() as i64
}

fn parse_wire_date(raw: &str) -> Result<NaiveDate, TransactionSourceError> {
    if let Ok(stamp) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(stamp.date_naive());
    }

    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|err| {
        TransactionSourceError::Upstream {
            status: None,
            message: format!("unparseable transaction date '{raw}': {err}"),
        }
    })
}

/// HTTP webhook client for the downstream ledger.
///
/// Every failure mode (non-2xx, timeout, transport) is retried until the
/// budget runs out; the exhausted error is for the caller's logs only and
/// must never fail a decision.
pub struct HttpLedgerNotifier {
    url: String,
    max_retries: u32,
    client: reqwest::Client,
}

impl HttpLedgerNotifier {
    pub fn new(config: &LedgerWebhookConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs_f64(config.timeout_seconds))
            .build()
            .map_err(|err| NotifyError::Transport(err.to_string()))?;

        Ok(Self {
            url: config.url.clone(),
            max_retries: config.max_retries.max(1),
            client,
        })
    }
}

#[async_trait]
impl LedgerNotifier for HttpLedgerNotifier {
    async fn plan_created(&self, plan: &Plan) -> Result<(), NotifyError> {
        let payload = json!({
            "event": "plan_created",
            "plan_id": plan.id,
            "user_id": plan.user_id,
            "total_cents": plan.total_cents,
            "num_installments": plan.installments.len(),
            "installments": plan
                .installments
                .iter()
                .map(|installment| {
                    json!({
                        "installment_id": installment.id,
                        "due_date": installment.due_date,
                        "amount_cents": installment.amount_cents,
                    })
                })
                .collect::<Vec<_>>(),
            "created_at": plan.created_at,
        });

        for attempt in 0..self.max_retries {
            match self.client.post(&self.url).json(&payload).send().await {
                Ok(response) if response.status().as_u16() < 400 => {
                    metrics::counter!("webhook_success_total").increment(1);
                    return Ok(());
                }
                Ok(response) => {
                    warn!(
                        status = response.status().as_u16(),
                        attempt = attempt + 1,
                        "ledger webhook rejected"
                    );
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        attempt = attempt + 1,
                        "ledger webhook request failed"
                    );
                }
            }

            if attempt + 1 < self.max_retries {
                metrics::counter!("webhook_retry_total").increment(1);
                tokio::time::sleep(backoff_delay(attempt)).await;
            }
        }

        metrics::counter!("webhook_failures_total").increment(1);
        Err(NotifyError::RetriesExhausted {
            attempts: self.max_retries,
        })
    }
}

/// 100ms, 200ms, 400ms, ... capped so a misconfigured retry budget cannot
/// produce multi-minute sleeps.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(100 * 2u64.pow(attempt.min(8)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_dates_accept_timestamps_and_plain_dates() {
        let from_stamp = parse_wire_date("2025-03-04T10:15:00Z").expect("timestamp parses");
        let from_date = parse_wire_date("2025-03-04").expect("plain date parses");

        assert_eq!(from_stamp, from_date);
        assert!(parse_wire_date("yesterday").is_err());
    }

    #[test]
    fn wire_transaction_infers_kind_from_amount_sign() {
        let credit = WireTransaction {
            date: "2025-03-04".to_string(),
            amount_cents: Some(2_500),
            amount: None,
            balance_cents: Some(10_000),
            balance: None,
            kind: None,
            nsf: false,
            description: String::new(),
        };
        let debit = WireTransaction {
            amount_cents: Some(-2_500),
            ..credit_clone(&credit)
        };

        assert_eq!(credit.into_domain().expect("parses").kind, TransactionKind::Credit);
        assert_eq!(debit.into_domain().expect("parses").kind, TransactionKind::Debit);
    }

    #[test]
    fn wire_transaction_converts_dollar_floats() {
        let wire = WireTransaction {
            date: "2025-03-04".to_string(),
            amount_cents: None,
            amount: Some(-25.5),
            balance_cents: None,
            balance: Some(120.75),
            kind: Some("DEBIT".to_string()),
            nsf: true,
            description: "card purchase".to_string(),
        };

        let txn = wire.into_domain().expect("parses");
        assert_eq!(txn.amount_cents, -2_550);
        assert_eq!(txn.balance_cents, 12_075);
        assert_eq!(txn.kind, TransactionKind::Debit);
        assert!(txn.nsf);
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        assert_eq!(backoff_delay(0), Duration::from_millis(100));
        assert_eq!(backoff_delay(1), Duration::from_millis(200));
        assert_eq!(backoff_delay(3), Duration::from_millis(800));
    }

    fn credit_clone(wire: &WireTransaction) -> WireTransaction {
        WireTransaction {
            date: wire.date.clone(),
            amount_cents: wire.amount_cents,
            amount: wire.amount,
            balance_cents: wire.balance_cents,
            balance: wire.balance,
            kind: wire.kind.clone(),
            nsf: wire.nsf,
            description: wire.description.clone(),
        }
    }
}
