//! Implements the `Gateway` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a wallet service.

use crate::api::{decode, Gateway};
use crate::error::{ErrorType, IntoResult};
use crate::model::{Amount, Summary, TransactionId, Transactions, UserId};
use crate::Result;
use anyhow::{anyhow, Context};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::warn;

/// The user that the default seed data belongs to.
pub const DEMO_USER: &str = "demo";

/// The three gateway operations, used to inject failures and delays and to inspect calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchTransactions,
    FetchSummary,
    DeleteTransaction,
}

/// A recorded gateway call: which operation and the user or transaction ID it was made with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub operation: Operation,
    pub key: String,
}

/// An implementation of the `Gateway` trait that does not use the network. It holds raw JSON
/// payloads per user, so that malformed payloads go through the same decoding as real responses.
/// `TestGateway::default()` holds no data at all; `TestGateway::seeded()` holds demo data.
///
/// Deleting a transaction removes it from whichever user holds it and adjusts that user's summary
/// the way the service would.
#[derive(Debug, Default)]
pub struct TestGateway {
    state: Mutex<TestState>,
}

#[derive(Debug, Default)]
struct TestState {
    transactions: HashMap<UserId, Value>,
    summaries: HashMap<UserId, Value>,
    failures: HashMap<Operation, VecDeque<String>>,
    delays: HashMap<Operation, VecDeque<Duration>>,
    calls: Vec<Call>,
}

impl TestGateway {
    /// Creates a `TestGateway` seeded with the demo data for `DEMO_USER`.
    pub fn seeded() -> Self {
        let mut state = TestState::default();
        let user = UserId::from(DEMO_USER);
        state.transactions.insert(user.clone(), demo_transactions());
        state.summaries.insert(user, demo_summary());
        Self {
            state: Mutex::new(state),
        }
    }

    /// Sets the raw JSON that `GET /transactions/{user_id}` will return.
    pub async fn set_transactions(&self, user_id: impl Into<UserId>, payload: Value) {
        let mut state = self.state.lock().await;
        state.transactions.insert(user_id.into(), payload);
    }

    /// Sets the raw JSON that `GET /transactions/summary/{user_id}` will return.
    pub async fn set_summary(&self, user_id: impl Into<UserId>, payload: Value) {
        let mut state = self.state.lock().await;
        state.summaries.insert(user_id.into(), payload);
    }

    /// Makes the next call of `operation` fail with `message`. Calling this more than once queues
    /// failures for subsequent calls.
    pub async fn fail_next(&self, operation: Operation, message: impl Into<String>) {
        let mut state = self.state.lock().await;
        state
            .failures
            .entry(operation)
            .or_default()
            .push_back(message.into());
    }

    /// Makes the next call of `operation` sleep for `delay` before answering. Queues like
    /// `fail_next`.
    pub async fn delay_next(&self, operation: Operation, delay: Duration) {
        let mut state = self.state.lock().await;
        state
            .delays
            .entry(operation)
            .or_default()
            .push_back(delay);
    }

    /// All calls received so far, in order.
    pub async fn calls(&self) -> Vec<Call> {
        self.state.lock().await.calls.clone()
    }

    /// How many times `operation` has been called.
    pub async fn call_count(&self, operation: Operation) -> usize {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    /// Records the call and pops any injected delay and failure for it. The delay is served
    /// without holding the lock so that concurrent calls can interleave.
    async fn begin(&self, operation: Operation, key: &str) -> Result<()> {
        let (delay, failure) = {
            let mut state = self.state.lock().await;
            state.calls.push(Call {
                operation,
                key: key.to_string(),
            });
            let delay = state
                .delays
                .get_mut(&operation)
                .and_then(|queue| queue.pop_front());
            let failure = state
                .failures
                .get_mut(&operation)
                .and_then(|queue| queue.pop_front());
            (delay, failure)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(message) => Err(anyhow!(message)).pub_result(ErrorType::Network),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl Gateway for TestGateway {
    async fn fetch_transactions(&self, user_id: &UserId) -> Result<Transactions> {
        self.begin(Operation::FetchTransactions, user_id.as_str())
            .await?;
        let payload = {
            let state = self.state.lock().await;
            state
                .transactions
                .get(user_id)
                .cloned()
                .unwrap_or_else(|| json!([]))
        };
        decode::transactions_value(payload)
            .context("Failed to fetch transactions")
            .pub_result(ErrorType::Parse)
    }

    async fn fetch_summary(&self, user_id: &UserId) -> Result<Summary> {
        self.begin(Operation::FetchSummary, user_id.as_str())
            .await?;
        let state = self.state.lock().await;
        Ok(state
            .summaries
            .get(user_id)
            .map(decode::summary_value)
            .unwrap_or(Summary::ZERO))
    }

    async fn delete_transaction(&self, id: &TransactionId) -> Result<()> {
        self.begin(Operation::DeleteTransaction, id.as_str())
            .await?;
        let mut state = self.state.lock().await;

        let mut removed = None;
        for (user_id, payload) in state.transactions.iter_mut() {
            let Value::Array(rows) = payload else {
                continue;
            };
            if let Some(ix) = rows.iter().position(|row| row_id(row).as_deref() == Some(id.as_str()))
            {
                let row = rows.remove(ix);
                let amount = row
                    .get("amount")
                    .and_then(|v| serde_json::from_value::<Amount>(v.clone()).ok())
                    .unwrap_or_default();
                removed = Some((user_id.clone(), amount));
                break;
            }
        }

        let (user_id, amount) = removed
            .with_context(|| format!("Transaction not found: {id}"))
            .context("Failed to delete transaction")
            .pub_result(ErrorType::Network)?;

        if let Some(payload) = state.summaries.get_mut(&user_id) {
            if payload.is_object() {
                let current = decode::summary_value(payload);
                match without(current, amount) {
                    Some(next) => *payload = summary_json(&next),
                    None => {
                        warn!("Summary of {user_id} left as is, removing {amount} overflows it")
                    }
                }
            }
        }
        Ok(())
    }
}

/// The ID of a raw transaction row, whether the row holds it as a string or a number.
fn row_id(row: &Value) -> Option<String> {
    match row.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The summary as it would be once a transaction of `amount` no longer exists, or `None` if one
/// of the totals would overflow.
fn without(summary: Summary, amount: Amount) -> Option<Summary> {
    let balance = summary.balance().checked_sub(amount)?;
    if amount.is_negative() {
        let expenses = summary.expenses().checked_add(amount)?;
        Some(Summary::new(balance, summary.income(), expenses))
    } else {
        let income = summary.income().checked_sub(amount)?;
        Some(Summary::new(balance, income, summary.expenses()))
    }
}

fn summary_json(summary: &Summary) -> Value {
    json!({
        "balance": summary.balance().value().to_string(),
        "income": summary.income().value().to_string(),
        "expenses": summary.expenses().value().to_string(),
    })
}

fn demo_transactions() -> Value {
    json!([
        {"id": 5, "user_id": DEMO_USER, "title": "Paycheck", "amount": "2500.00",
         "category": "income", "created_at": "2025-07-01"},
        {"id": 4, "user_id": DEMO_USER, "title": "Rent", "amount": "-1200.00",
         "category": "bills", "created_at": "2025-07-01"},
        {"id": 3, "user_id": DEMO_USER, "title": "Groceries", "amount": "-86.40",
         "category": "food", "created_at": "2025-07-03"},
        {"id": 2, "user_id": DEMO_USER, "title": "Bus pass", "amount": "-45.00",
         "category": "transportation", "created_at": "2025-07-04"},
        {"id": 1, "user_id": DEMO_USER, "title": "Cinema", "amount": "-24.50",
         "category": "entertainment", "created_at": "2025-07-06"}
    ])
}

fn demo_summary() -> Value {
    json!({"balance": "1144.10", "income": "2500.00", "expenses": "1355.90"})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_demo_user() {
        let gw = TestGateway::seeded();
        let user = UserId::from(DEMO_USER);
        let list = gw.fetch_transactions(&user).await.unwrap();
        let summary = gw.fetch_summary(&user).await.unwrap();
        assert_eq!(list.len(), 5);
        assert!(summary.is_consistent());
    }

    #[tokio::test]
    async fn test_unknown_user_is_empty() {
        let gw = TestGateway::default();
        let user = UserId::from("nobody");
        assert!(gw.fetch_transactions(&user).await.unwrap().is_empty());
        assert_eq!(gw.fetch_summary(&user).await.unwrap(), Summary::ZERO);
    }

    #[tokio::test]
    async fn test_fail_next_is_one_shot() {
        let gw = TestGateway::default();
        let user = UserId::from("u1");
        gw.fail_next(Operation::FetchSummary, "Failed to fetch summary")
            .await;
        let err = gw.fetch_summary(&user).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Network);
        assert_eq!(err.message(), "Failed to fetch summary");
        assert!(gw.fetch_summary(&user).await.is_ok());
        assert_eq!(gw.call_count(Operation::FetchSummary).await, 2);
    }

    #[tokio::test]
    async fn test_delete_adjusts_summary() {
        let gw = TestGateway::default();
        gw.set_transactions("u1", json!([{"id": "t1", "amount": -20, "category": "food"}]))
            .await;
        gw.set_summary("u1", json!({"balance": 80, "income": 100, "expenses": 20}))
            .await;
        gw.delete_transaction(&"t1".into()).await.unwrap();

        let user = UserId::from("u1");
        assert!(gw.fetch_transactions(&user).await.unwrap().is_empty());
        assert_eq!(
            gw.fetch_summary(&user).await.unwrap(),
            Summary::new(100, 100, 0)
        );
    }

    #[tokio::test]
    async fn test_delete_income_adjusts_summary() {
        let gw = TestGateway::seeded();
        gw.delete_transaction(&"5".into()).await.unwrap();
        let summary = gw.fetch_summary(&UserId::from(DEMO_USER)).await.unwrap();
        assert_eq!(summary.income(), Amount::ZERO);
        assert!(summary.is_consistent());
    }

    #[tokio::test]
    async fn test_delete_keeps_summary_on_overflow() {
        let gw = TestGateway::default();
        gw.set_transactions("u1", json!([{"id": "t1", "amount": 1, "category": "salary"}]))
            .await;
        let extreme = json!({
            "balance": "-79228162514264337593543950335",
            "income": 0,
            "expenses": 0
        });
        gw.set_summary("u1", extreme.clone()).await;
        gw.delete_transaction(&"t1".into()).await.unwrap();

        let user = UserId::from("u1");
        assert!(gw.fetch_transactions(&user).await.unwrap().is_empty());
        assert_eq!(
            gw.fetch_summary(&user).await.unwrap(),
            decode::summary_value(&extreme)
        );
    }

    #[tokio::test]
    async fn test_delete_unknown_fails() {
        let gw = TestGateway::seeded();
        let err = gw.delete_transaction(&"404".into()).await.unwrap_err();
        assert_eq!(err.message(), "Failed to delete transaction");
        assert_eq!(gw.calls().await.len(), 1);
    }
}
