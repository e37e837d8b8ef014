pub mod blockchain;
pub mod models;
pub mod error;
pub mod logging;
pub mod config;
pub mod notify;

pub use blockchain::{HeliusClient, WalletMonitor, WalletMonitorConfig};
pub use error::{TrackerError, FetchError, ConfigError, MonitorError, NotifyError, Result};
pub use logging::{LogContext, PerformanceMonitor, MetricsLogger};
pub use config::{AppConfig, HeliusConfig, TrackerConfig, LoggingConfig, TelegramConfig};
pub use notify::{Notifier, TelegramNotifier};
