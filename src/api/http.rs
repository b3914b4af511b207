//! Implements the `Gateway` trait using `reqwest` against the configured wallet service.

use crate::api::{decode, Gateway, SUMMARY, TRANSACTIONS};
use crate::error::{ErrorType, IntoResult, Res};
use crate::model::{Summary, TransactionId, Transactions, UserId};
use crate::{Config, Result};
use anyhow::{anyhow, bail, Context};
use reqwest::Method;
use tracing::trace;
use url::Url;

/// Talks to the wallet service over HTTP. No retries and no timeout of its own; when the config
/// sets `request_timeout_secs` that is handed to the `reqwest` client.
pub(crate) struct HttpGateway {
    base: Url,
    client: reqwest::Client,
}

impl HttpGateway {
    pub(crate) fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .context("Unable to create the HTTP client")
            .pub_result(ErrorType::Config)?;
        Ok(Self {
            base: config.api_url().clone(),
            client,
        })
    }

    /// Appends `segments` to the base URL. Each segment is percent-encoded, so an ID containing
    /// a `/` cannot escape its path segment.
    fn endpoint(&self, segments: &[&str]) -> Res<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("The API URL '{}' cannot be used as a base", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends a request and returns the body text if the status is a success.
    async fn send(&self, method: Method, url: Url) -> Res<String> {
        trace!("{method} {url}");
        let response = self
            .client
            .request(method.clone(), url.clone())
            .send()
            .await
            .with_context(|| format!("{method} {url} could not be sent"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            bail!("{method} {url} failed with status {status}: {body}");
        }

        response
            .text()
            .await
            .with_context(|| format!("Unable to read the response body of {method} {url}"))
    }
}

#[async_trait::async_trait]
impl Gateway for HttpGateway {
    async fn fetch_transactions(&self, user_id: &UserId) -> Result<Transactions> {
        let url = self
            .endpoint(&[TRANSACTIONS, user_id.as_str()])
            .pub_result(ErrorType::Config)?;
        let body = self
            .send(Method::GET, url)
            .await
            .context("Failed to fetch transactions")
            .pub_result(ErrorType::Network)?;
        decode::transactions(&body)
            .context("Failed to fetch transactions")
            .pub_result(ErrorType::Parse)
    }

    async fn fetch_summary(&self, user_id: &UserId) -> Result<Summary> {
        let url = self
            .endpoint(&[TRANSACTIONS, SUMMARY, user_id.as_str()])
            .pub_result(ErrorType::Config)?;
        let body = self
            .send(Method::GET, url)
            .await
            .context("Failed to fetch summary")
            .pub_result(ErrorType::Network)?;
        decode::summary(&body)
            .context("Failed to fetch summary")
            .pub_result(ErrorType::Parse)
    }

    async fn delete_transaction(&self, id: &TransactionId) -> Result<()> {
        let url = self
            .endpoint(&[TRANSACTIONS, id.as_str()])
            .pub_result(ErrorType::Config)?;
        self.send(Method::DELETE, url)
            .await
            .context("Failed to delete transaction")
            .pub_result(ErrorType::Network)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Amount;
    use axum::extract::Path;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// Serves `router` on an ephemeral local port and returns the API base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{addr}/api")
    }

    fn gateway(base: &str) -> HttpGateway {
        HttpGateway::new(&Config::new(base).unwrap()).unwrap()
    }

    fn happy_router(deleted: Arc<Mutex<Vec<String>>>) -> Router {
        Router::new()
            .route(
                "/api/transactions/summary/{user_id}",
                get(|Path(user_id): Path<String>| async move {
                    assert_eq!(user_id, "u1");
                    Json(json!({"balance": "80.00", "income": "100.00", "expenses": "20.00"}))
                }),
            )
            .route(
                "/api/transactions/{id}",
                get(|Path(user_id): Path<String>| async move {
                    Json(json!([
                        {"id": 1, "user_id": user_id, "title": "Pizza", "amount": "-20.00",
                         "category": "food", "created_at": "2025-07-01T12:00:00.000Z"}
                    ]))
                })
                .delete(move |Path(id): Path<String>| {
                    let deleted = deleted.clone();
                    async move {
                        deleted.lock().unwrap().push(id);
                        Json(json!({"message": "Transaction deleted successfully"}))
                    }
                }),
            )
    }

    #[tokio::test]
    async fn test_fetch_transactions() {
        let base = serve(happy_router(Arc::default())).await;
        let list = gateway(&base)
            .fetch_transactions(&UserId::from("u1"))
            .await
            .unwrap();
        assert_eq!(list.len(), 1);
        let t = list.get(&"1".into()).unwrap();
        assert_eq!(t.amount(), Amount::from(-20));
        assert_eq!(t.title(), Some("Pizza"));
        assert_eq!(t.user_id().unwrap().as_str(), "u1");
    }

    #[tokio::test]
    async fn test_fetch_summary() {
        let base = serve(happy_router(Arc::default())).await;
        let summary = gateway(&base)
            .fetch_summary(&UserId::from("u1"))
            .await
            .unwrap();
        assert_eq!(summary, Summary::new(80, 100, 20));
    }

    #[tokio::test]
    async fn test_delete_transaction() {
        let deleted = Arc::new(Mutex::new(Vec::new()));
        let base = serve(happy_router(deleted.clone())).await;
        gateway(&format!("{base}/"))
            .delete_transaction(&"42".into())
            .await
            .unwrap();
        assert_eq!(*deleted.lock().unwrap(), vec!["42".to_string()]);
    }

    #[tokio::test]
    async fn test_error_status_is_network_error() {
        let router = Router::new().route(
            "/api/transactions/{id}",
            get(|| async { (AxumStatus::INTERNAL_SERVER_ERROR, "boom") })
                .delete(|| async { (AxumStatus::NOT_FOUND, "Transaction not found") }),
        );
        let base = serve(router).await;
        let gw = gateway(&base);

        let err = gw.fetch_transactions(&UserId::from("u1")).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Network);
        assert_eq!(err.message(), "Failed to fetch transactions");

        let err = gw.delete_transaction(&"9".into()).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Network);
        assert_eq!(err.message(), "Failed to delete transaction");
        assert!(format!("{err:?}").contains("404"));
    }

    #[tokio::test]
    async fn test_malformed_payloads_degrade() {
        let router = Router::new()
            .route(
                "/api/transactions/summary/{user_id}",
                get(|| async { Json(json!([1, 2, 3])) }),
            )
            .route(
                "/api/transactions/{id}",
                get(|| async { Json(json!({"unexpected": true})) }),
            );
        let base = serve(router).await;
        let gw = gateway(&base);
        let user = UserId::from("u1");
        assert!(gw.fetch_transactions(&user).await.unwrap().is_empty());
        assert_eq!(gw.fetch_summary(&user).await.unwrap(), Summary::ZERO);
    }

    #[tokio::test]
    async fn test_non_json_body_is_parse_error() {
        let router = Router::new().route(
            "/api/transactions/summary/{user_id}",
            get(|| async { "<html>maintenance</html>" }),
        );
        let base = serve(router).await;
        let err = gateway(&base)
            .fetch_summary(&UserId::from("u1"))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Parse);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Bind then drop to get a port that is very likely closed.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = gateway(&format!("http://{addr}/api"))
            .fetch_summary(&UserId::from("u1"))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Network);
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let gw = gateway("http://localhost:5001/api/");
        let url = gw.endpoint(&[TRANSACTIONS, "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5001/api/transactions/a%2Fb%20c");
    }
}
