use thiserror::Error;

/// Main error type for the wallet tracker
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Monitor error: {0}")]
    Monitor(#[from] MonitorError),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

/// Errors raised while fetching transactions for one address.
///
/// None of these are fatal: the monitor logs them and moves on to the next
/// address, retrying on the following cycle.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {status} {body}")]
    Status { status: u16, body: String },

    #[error("Timeout after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Authentication failed")]
    Authentication,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Latest transaction for {address} has no signature")]
    MissingSignature { address: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing Helius API key (set HELIUS_API_KEY or helius.api_key)")]
    MissingApiKey,

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file could not be read: {path}: {reason}")]
    FileRead { path: String, reason: String },

    #[error("Configuration parsing failed: {0}")]
    Parsing(String),

    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),

    #[error("No wallets configured (set TRACKED_WALLETS, tracker.wallets or --wallet)")]
    NoWallets,

    #[error("Wallet listed more than once: {0}")]
    DuplicateWallet(String),
}

/// Errors raised while forwarding a notification to an external sink.
///
/// Console output is unaffected; the monitor logs these and carries on.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error: {status} {body}")]
    Status { status: u16, body: String },

    #[error("Message rejected: {0}")]
    Rejected(String),
}

/// Errors raised by the tracker loop itself
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("Wallet is not tracked: {0}")]
    UnknownWallet(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, TrackerError>;
