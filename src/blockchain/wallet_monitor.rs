use std::collections::BTreeMap;
use std::io::Write;
use std::time::{Duration, Instant};

use log::info;

use crate::blockchain::fetcher::{Sleeper, TransactionFetcher};
use crate::blockchain::signature_cache::SignatureCache;
use crate::config::TrackerConfig;
use crate::error::{FetchError, MonitorError};
use crate::logging::{LogContext, MetricsLogger};
use crate::models::Notification;
use crate::notify::Notifier;

pub struct WalletMonitorConfig {
    pub poll_interval: Duration,
}

impl Default for WalletMonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
        }
    }
}

impl From<&TrackerConfig> for WalletMonitorConfig {
    fn from(config: &TrackerConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.poll_interval_seconds),
        }
    }
}

/// Outcome of checking one wallet
#[derive(Debug)]
pub enum WalletCheck {
    New(Notification),
    Unchanged,
    Empty,
    Failed(FetchError),
}

/// Summary of one pass over every tracked wallet.
///
/// Notifications listed here have already been written to the output.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub notifications: Vec<Notification>,
    pub failed: Vec<String>,
    pub empty: Vec<String>,
    pub unchanged: usize,
}

/// Polls each tracked wallet in order and reports new transactions.
///
/// Wallets are checked one at a time; a failure for one wallet is logged and
/// never stops the cycle. Each notification is written to `output` as soon as
/// it is detected, then handed to the notifier.
pub struct WalletMonitor<F, S, W, N = ()> {
    fetcher: F,
    sleeper: S,
    output: W,
    notifier: N,
    wallets: Vec<String>,
    labels: BTreeMap<String, String>,
    last_seen: SignatureCache,
    pub config: WalletMonitorConfig,
    cycles_completed: u64,
}

impl<F, S, W> WalletMonitor<F, S, W> {
    pub fn new(
        fetcher: F,
        sleeper: S,
        output: W,
        wallets: Vec<String>,
        config: Option<WalletMonitorConfig>,
    ) -> Self {
        let last_seen = SignatureCache::new(wallets.iter().cloned());
        Self {
            fetcher,
            sleeper,
            output,
            notifier: (),
            wallets,
            labels: BTreeMap::new(),
            last_seen,
            config: config.unwrap_or_default(),
            cycles_completed: 0,
        }
    }
}

impl<F, S, W, N> WalletMonitor<F, S, W, N> {
    /// Forward every notification to `notifier` after it is printed
    pub fn with_notifier<M>(self, notifier: M) -> WalletMonitor<F, S, W, M> {
        WalletMonitor {
            fetcher: self.fetcher,
            sleeper: self.sleeper,
            output: self.output,
            notifier,
            wallets: self.wallets,
            labels: self.labels,
            last_seen: self.last_seen,
            config: self.config,
            cycles_completed: self.cycles_completed,
        }
    }

    /// Display names keyed by address; entries for untracked wallets are unused
    pub fn with_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn wallets(&self) -> &[String] {
        &self.wallets
    }

    pub fn last_seen(&self) -> &SignatureCache {
        &self.last_seen
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn label(&self, address: &str) -> Option<&str> {
        self.labels.get(address).map(String::as_str)
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }
}

impl<F, S, W, N> WalletMonitor<F, S, W, N>
where
    F: TransactionFetcher,
    S: Sleeper,
    W: Write,
    N: Notifier,
{
    /// Write the startup banner
    pub fn write_banner(&mut self) -> Result<(), MonitorError> {
        writeln!(self.output, "Starting wallet tracker...")?;
        writeln!(self.output, "Tracking wallets: {}", self.wallets.join(", "))?;
        self.output.flush()?;
        Ok(())
    }

    /// Run `limit` cycles, or forever when `None`, sleeping between cycles
    pub async fn run_cycles(&mut self, limit: Option<u64>) -> Result<(), MonitorError> {
        info!(
            "Starting wallet monitor for {} wallets with {} second polling interval",
            self.wallets.len(),
            self.config.poll_interval.as_secs()
        );

        if limit == Some(0) {
            return Ok(());
        }

        let mut remaining = limit;
        loop {
            self.run_cycle().await?;

            if let Some(n) = remaining.as_mut() {
                *n = n.saturating_sub(1);
                if *n == 0 {
                    return Ok(());
                }
            }

            self.sleeper.sleep(self.config.poll_interval).await;
        }
    }

    /// Check every wallet once, updating the last-seen signatures
    pub async fn run_cycle(&mut self) -> Result<CycleReport, MonitorError> {
        let started = Instant::now();
        let mut report = CycleReport::default();

        for index in 0..self.wallets.len() {
            let address = self.wallets[index].clone();

            match self.check_wallet(&address).await? {
                WalletCheck::New(notification) => {
                    self.emit(&notification).await?;
                    report.notifications.push(notification);
                }
                WalletCheck::Unchanged => report.unchanged += 1,
                WalletCheck::Empty => report.empty.push(address),
                WalletCheck::Failed(e) => {
                    LogContext::new("wallet_monitor", "check_wallet")
                        .with_address(&address)
                        .error(&format!("Error checking wallet {}: {}", address, e));
                    report.failed.push(address);
                }
            }
        }

        self.cycles_completed += 1;
        MetricsLogger::log_cycle_completed(
            self.cycles_completed,
            self.wallets.len(),
            report.notifications.len(),
            report.failed.len(),
            started.elapsed().as_millis() as u64,
        );

        Ok(report)
    }

    /// Fetch one wallet and compare its newest signature with the last one seen.
    ///
    /// The first element of the response is trusted to be the newest.
    pub async fn check_wallet(&mut self, address: &str) -> Result<WalletCheck, MonitorError> {
        let transactions = match self.fetcher.fetch_transactions(address).await {
            Ok(transactions) => transactions,
            Err(e) => return Ok(WalletCheck::Failed(e)),
        };

        let Some(latest) = transactions.first() else {
            return Ok(WalletCheck::Empty);
        };

        let Some(signature) = latest.signature() else {
            return Ok(WalletCheck::Failed(FetchError::MissingSignature {
                address: address.to_string(),
            }));
        };

        if !self.last_seen.is_new(address, signature) {
            return Ok(WalletCheck::Unchanged);
        }

        self.last_seen.record(address, signature)?;
        LogContext::new("wallet_monitor", "check_wallet")
            .with_address(address)
            .with_signature(signature)
            .debug("New transaction detected");

        let notification = Notification::new(address, latest.type_label(), signature)
            .with_label(self.label(address));
        Ok(WalletCheck::New(notification))
    }

    /// Print one notification, then forward it.
    ///
    /// Output failures are fatal; a notifier failure is logged and skipped.
    async fn emit(&mut self, notification: &Notification) -> Result<(), MonitorError> {
        writeln!(self.output, "{}", notification)?;
        self.output.flush()?;

        if let Err(e) = self.notifier.notify(notification).await {
            LogContext::new("wallet_monitor", "notify")
                .with_address(&notification.address)
                .with_signature(&notification.signature)
                .warn(&format!("Failed to forward notification for {}: {}", notification.address, e));
        }
        Ok(())
    }
}
