use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

use crate::blockchain::fetcher::TransactionFetcher;
use crate::config::HeliusConfig;
use crate::error::FetchError;
use crate::logging::{LogContext, MetricsLogger, PerformanceMonitor};
use crate::models::TransactionSummary;

/// Longest error body kept in a `FetchError::Status`
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Client for the Helius enhanced transactions API
#[derive(Clone)]
pub struct HeliusClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout_seconds: u64,
}

impl HeliusClient {
    pub fn new(config: &HeliusConfig) -> Result<Self, FetchError> {
        let context = LogContext::new("helius_client", "initialization")
            .with_metadata("base_url", serde_json::json!(config.base_url))
            .with_metadata("timeout_seconds", serde_json::json!(config.timeout_seconds));
        context.debug("Initializing Helius client");

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            timeout_seconds: config.timeout_seconds,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Path of the address-transactions endpoint, without the API key
    pub fn transactions_path(address: &str) -> String {
        format!("/v0/addresses/{}/transactions", address)
    }

    async fn request_transactions(&self, address: &str) -> Result<Vec<TransactionSummary>, FetchError> {
        let url = format!("{}{}", self.base_url, Self::transactions_path(address));

        let response = self
            .client
            .get(&url)
            .query(&[("api-key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchError::Authentication,
                StatusCode::TOO_MANY_REQUESTS => FetchError::RateLimit,
                _ => {
                    let body = response.text().await.unwrap_or_default();
                    FetchError::Status {
                        status: status.as_u16(),
                        body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
                    }
                }
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        parse_transactions(&body)
    }

    // reqwest errors carry the request URL, which includes the API key
    fn classify_send_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout { seconds: self.timeout_seconds }
        } else if e.is_connect() {
            FetchError::Connection(e.without_url().to_string())
        } else {
            FetchError::Http(e.without_url())
        }
    }
}

impl TransactionFetcher for HeliusClient {
    // Failures are returned unlogged; the monitor reports each one once
    async fn fetch_transactions(&self, address: &str) -> Result<Vec<TransactionSummary>, FetchError> {
        let monitor = PerformanceMonitor::new("helius_get_transactions")
            .with_metadata("address", serde_json::json!(address));

        let transactions = self.request_transactions(address).await?;
        let duration = monitor.finish();
        MetricsLogger::log_api_call(&Self::transactions_path(address), duration, transactions.len());

        let mut context = LogContext::new("helius_client", "get_transactions")
            .with_address(address)
            .with_metadata("transaction_count", serde_json::json!(transactions.len()));
        if let Some(latest) = transactions.first() {
            context = context
                .with_metadata("latest_type", serde_json::json!(latest.tx_type))
                .with_metadata("latest_timestamp", serde_json::json!(latest.timestamp()))
                .with_metadata("latest_description", serde_json::json!(latest.description()));
        }
        context.trace(&format!("Retrieved {} transactions", transactions.len()));

        Ok(transactions)
    }
}

/// Parse a response body: an array of transactions, or `null` for none.
///
/// Only the newest element must be a well-formed transaction. Older elements
/// are never inspected by the tracker, so a malformed one becomes an empty
/// summary instead of failing the fetch.
pub fn parse_transactions(body: &str) -> Result<Vec<TransactionSummary>, FetchError> {
    let items = match serde_json::from_str::<Value>(body)? {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        Value::Object(_) => {
            return Err(FetchError::InvalidResponse(
                "expected an array of transactions, got an object".to_string(),
            ))
        }
        other => {
            return Err(FetchError::InvalidResponse(format!(
                "expected an array of transactions, got {}",
                other
            )))
        }
    };

    let mut items = items.into_iter();
    let Some(latest) = items.next() else {
        return Ok(Vec::new());
    };

    let mut transactions = vec![serde_json::from_value::<TransactionSummary>(latest)?];
    transactions.extend(items.map(|item| serde_json::from_value(item).unwrap_or_default()));
    Ok(transactions)
}
