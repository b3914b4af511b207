//! The remote wallet service boundary.
//!
//! The `Gateway` trait is the seam between the sync layer and the network. `HttpGateway` talks to
//! a real wallet service with `reqwest`, and `TestGateway` serves in-memory data so that the whole
//! program can run, top to bottom, without a server.

mod decode;
mod http;
mod test_gateway;

use crate::model::{Summary, TransactionId, Transactions, UserId};
use crate::{Config, Result};
use std::sync::Arc;

pub(crate) use http::HttpGateway;
pub use test_gateway::{Call, Operation, TestGateway, DEMO_USER};

/// Path segment under which the service exposes transactions.
const TRANSACTIONS: &str = "transactions";

/// Path segment, below `TRANSACTIONS`, under which the service exposes the summary.
const SUMMARY: &str = "summary";

/// When this environment variable is set to a non-empty value, `Mode::from_env` returns
/// `Mode::Testing`.
pub const TEST_MODE_ENV: &str = "WALLET_SYNC_IN_TEST_MODE";

/// Whether we are talking to a live wallet service or to in-memory test data.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Http,
    Testing,
}

impl Mode {
    /// Returns `Mode::Testing` when `WALLET_SYNC_IN_TEST_MODE` is set and non-empty, otherwise
    /// `Mode::Http`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Testing,
            _ => Mode::Http,
        }
    }
}

/// The three requests the sync layer makes against the wallet service. Each call is a single
/// attempt; nothing here retries.
#[async_trait::async_trait]
pub trait Gateway: Send + Sync {
    /// `GET {base}/transactions/{user_id}`.
    ///
    /// Fails with `ErrorType::Network` when the transport fails or the status is not a success,
    /// and with `ErrorType::Parse` when the body is not JSON or the array holds a record that is
    /// not a transaction. A JSON body that is not an array yields an empty collection.
    async fn fetch_transactions(&self, user_id: &UserId) -> Result<Transactions>;

    /// `GET {base}/transactions/summary/{user_id}`.
    ///
    /// Same failure modes as `fetch_transactions`. A JSON body that is not an object yields
    /// `Summary::ZERO`, and missing or non-numeric fields inside an object read as zero.
    async fn fetch_summary(&self, user_id: &UserId) -> Result<Summary>;

    /// `DELETE {base}/transactions/{id}`. Fails with `ErrorType::Network` on a transport failure
    /// or a non-success status. The response body is ignored.
    async fn delete_transaction(&self, id: &TransactionId) -> Result<()>;
}

/// Creates the `Gateway` implementation for `mode`.
pub fn gateway(config: &Config, mode: Mode) -> Result<Arc<dyn Gateway>> {
    Ok(match mode {
        Mode::Http => Arc::new(HttpGateway::new(config)?),
        Mode::Testing => Arc::new(TestGateway::seeded()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_default_is_http() {
        assert_eq!(Mode::default(), Mode::Http);
    }

    #[tokio::test]
    async fn test_gateway_factory_testing_mode() {
        let gateway = gateway(&Config::default(), Mode::Testing).unwrap();
        let transactions = gateway
            .fetch_transactions(&UserId::from(DEMO_USER))
            .await
            .unwrap();
        assert!(!transactions.is_empty());
    }
}
