use std::future::Future;
use std::time::Duration;

use crate::error::FetchError;
use crate::models::TransactionSummary;

/// Source of recent transactions for a wallet, newest first
pub trait TransactionFetcher {
    fn fetch_transactions(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Vec<TransactionSummary>, FetchError>>;
}

/// Delay between polling cycles
pub trait Sleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
