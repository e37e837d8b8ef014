pub mod fetcher;
pub mod helius_client;
pub mod signature_cache;
pub mod wallet_monitor;

pub use fetcher::{Sleeper, TokioSleeper, TransactionFetcher};
pub use helius_client::{HeliusClient, parse_transactions};
pub use signature_cache::SignatureCache;
pub use wallet_monitor::{CycleReport, WalletCheck, WalletMonitor, WalletMonitorConfig};
