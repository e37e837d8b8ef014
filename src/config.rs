use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::env;
use std::fs;
use std::path::Path;
use crate::error::ConfigError;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub helius: HeliusConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

/// Helius indexing API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeliusConfig {
    /// API key sent as the `api-key` query parameter
    pub api_key: String,
    /// Base URL of the Helius REST API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

/// Wallet tracking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Wallet addresses to track, in polling order
    pub wallets: Vec<String>,
    /// Delay between polling cycles in seconds
    pub poll_interval_seconds: u64,
    /// Optional display names, keyed by wallet address
    pub labels: BTreeMap<String, String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

/// Telegram forwarding; disabled while `bot_token` is empty
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    /// Base URL of the Bot API
    pub api_base_url: String,
}

impl TelegramConfig {
    pub fn enabled(&self) -> bool {
        !self.bot_token.trim().is_empty()
    }
}

impl Default for HeliusConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.helius.xyz".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            wallets: Vec::new(),
            poll_interval_seconds: 10,
            labels: BTreeMap::new(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            api_base_url: "https://api.telegram.org".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables, then validate.
    /// Environment variables take precedence over file values.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let config = Self::resolve(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Merge file and environment sources without validating, so callers can
    /// apply further overrides (command line flags) first.
    pub fn resolve(path: Option<&str>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(path) => path.to_string(),
            None => env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string()),
        };

        let mut config = Self::load_from_file(&config_path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a TOML file; a missing file yields defaults
    pub fn load_from_file(config_path: &str) -> Result<Self, ConfigError> {
        if !Path::new(config_path).exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)
            .map_err(|e| ConfigError::FileRead {
                path: config_path.to_string(),
                reason: e.to_string(),
            })?;
        toml::from_str(&content)
            .map_err(|e| ConfigError::Parsing(e.to_string()))
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        // Helius configuration
        if let Ok(api_key) = env::var("HELIUS_API_KEY") {
            self.helius.api_key = api_key;
        }
        if let Ok(base_url) = env::var("HELIUS_BASE_URL") {
            self.helius.base_url = base_url;
        }
        if let Ok(timeout) = env::var("HELIUS_TIMEOUT_SECONDS") {
            self.helius.timeout_seconds = parse_env("HELIUS_TIMEOUT_SECONDS", timeout)?;
        }

        // Tracker configuration
        if let Ok(wallets) = env::var("TRACKED_WALLETS") {
            self.set_wallets(split_wallet_list(&wallets));
        }
        if let Ok(interval) = env::var("POLL_INTERVAL_SECONDS") {
            self.tracker.poll_interval_seconds = parse_env("POLL_INTERVAL_SECONDS", interval)?;
        }

        // Logging configuration
        if let Ok(level) = env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = env::var("LOG_FORMAT") {
            self.logging.format = format;
        }

        // Telegram configuration
        if let Ok(token) = env::var("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = token;
        }
        if let Ok(chat_id) = env::var("TELEGRAM_CHAT_ID") {
            self.telegram.chat_id = chat_id;
        }
        if let Ok(url) = env::var("TELEGRAM_API_URL") {
            self.telegram.api_base_url = url;
        }

        Ok(())
    }

    /// Replace the tracked wallets with `ADDRESS` or `ADDRESS=Label` entries.
    ///
    /// Labels from entries that carry one are added to `tracker.labels`.
    pub fn set_wallets<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.tracker.wallets.clear();
        for entry in entries {
            let (address, label) = parse_wallet_entry(&entry);
            if let Some(label) = label {
                self.tracker.labels.insert(address.clone(), label);
            }
            self.tracker.wallets.push(address);
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.helius.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        if !self.helius.base_url.starts_with("http://") && !self.helius.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidUrl(self.helius.base_url.clone()));
        }

        if self.helius.timeout_seconds == 0 || self.helius.timeout_seconds > 300 {
            return Err(ConfigError::InvalidValue {
                key: "helius.timeout_seconds".to_string(),
                value: self.helius.timeout_seconds.to_string(),
            });
        }

        if self.tracker.wallets.is_empty() {
            return Err(ConfigError::NoWallets);
        }

        let mut seen = HashSet::new();
        for wallet in &self.tracker.wallets {
            if wallet.is_empty() || wallet.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidValue {
                    key: "tracker.wallets".to_string(),
                    value: wallet.clone(),
                });
            }
            if !seen.insert(wallet.as_str()) {
                return Err(ConfigError::DuplicateWallet(wallet.clone()));
            }
        }

        if self.tracker.poll_interval_seconds == 0 || self.tracker.poll_interval_seconds > 3600 {
            return Err(ConfigError::InvalidValue {
                key: "tracker.poll_interval_seconds".to_string(),
                value: self.tracker.poll_interval_seconds.to_string(),
            });
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                value: self.logging.level.clone(),
            });
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.format".to_string(),
                value: self.logging.format.clone(),
            });
        }

        if self.telegram.enabled() {
            if self.telegram.chat_id.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "telegram.chat_id".to_string(),
                    value: self.telegram.chat_id.clone(),
                });
            }
            let url = &self.telegram.api_base_url;
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }

        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample_config() -> Result<String, ConfigError> {
        let mut config = Self::default();
        config.helius.api_key = "your_helius_api_key".to_string();
        config.tracker.wallets = vec![
            "wallet_address_1".to_string(),
            "wallet_address_2".to_string(),
        ];
        config.tracker.labels.insert("wallet_address_1".to_string(), "Main wallet".to_string());
        toml::to_string_pretty(&config)
            .map_err(|e| ConfigError::Parsing(e.to_string()))
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Split a comma-separated wallet list, trimming entries and dropping empty ones
pub fn split_wallet_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|wallet| !wallet.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split `ADDRESS=Label` into its parts; a blank label counts as none
pub fn parse_wallet_entry(entry: &str) -> (String, Option<String>) {
    match entry.split_once('=') {
        Some((address, label)) => {
            let label = label.trim();
            (
                address.trim().to_string(),
                (!label.is_empty()).then(|| label.to_string()),
            )
        }
        None => (entry.trim().to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tempfile::NamedTempFile;

    const ENV_KEYS: [&str; 11] = [
        "CONFIG_FILE",
        "HELIUS_API_KEY",
        "HELIUS_BASE_URL",
        "HELIUS_TIMEOUT_SECONDS",
        "TRACKED_WALLETS",
        "POLL_INTERVAL_SECONDS",
        "LOG_LEVEL",
        "LOG_FORMAT",
        "TELEGRAM_BOT_TOKEN",
        "TELEGRAM_CHAT_ID",
        "TELEGRAM_API_URL",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            env::remove_var(key);
        }
    }

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.helius.api_key = "test-key".to_string();
        config.tracker.wallets = vec!["W1".to_string(), "W2".to_string()];
        config
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.helius.base_url, "https://api.helius.xyz");
        assert_eq!(config.helius.timeout_seconds, 30);
        assert!(config.helius.api_key.is_empty());
        assert!(config.tracker.wallets.is_empty());
        assert_eq!(config.tracker.poll_interval_seconds, 10);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
        assert!(config.tracker.labels.is_empty());
        assert!(!config.telegram.enabled());
        assert_eq!(config.telegram.api_base_url, "https://api.telegram.org");
    }

    #[test]
    fn test_config_validation() {
        assert!(valid_config().validate().is_ok());

        let mut config = valid_config();
        config.helius.api_key = "   ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::MissingApiKey)));

        let mut config = valid_config();
        config.helius.base_url = "api.helius.xyz".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));

        let mut config = valid_config();
        config.helius.timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.tracker.wallets.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoWallets)));

        let mut config = valid_config();
        config.tracker.wallets.push("W1".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateWallet(w)) if w == "W1"));

        let mut config = valid_config();
        config.tracker.wallets.push("bad wallet".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));

        let mut config = valid_config();
        config.tracker.poll_interval_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_telegram_validation() {
        let mut config = valid_config();
        config.telegram.chat_id = String::new();
        assert!(config.validate().is_ok());

        config.telegram.bot_token = "123:abc".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "telegram.chat_id"
        ));

        config.telegram.chat_id = "42".to_string();
        assert!(config.validate().is_ok());

        config.telegram.api_base_url = "api.telegram.org".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_wallet_entries_with_labels() {
        assert_eq!(parse_wallet_entry("W1"), ("W1".to_string(), None));
        assert_eq!(
            parse_wallet_entry("W1= Main wallet "),
            ("W1".to_string(), Some("Main wallet".to_string()))
        );
        assert_eq!(parse_wallet_entry("W1="), ("W1".to_string(), None));

        let mut config = valid_config();
        config.set_wallets(vec!["A1=Treasury".to_string(), "B2".to_string()]);
        assert_eq!(config.tracker.wallets, vec!["A1", "B2"]);
        assert_eq!(config.tracker.labels.get("A1").map(String::as_str), Some("Treasury"));
        assert!(!config.tracker.labels.contains_key("B2"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_split_wallet_list() {
        assert_eq!(split_wallet_list(" W1, W2 ,,W3 "), vec!["W1", "W2", "W3"]);
        assert!(split_wallet_list("").is_empty());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        env::set_var("HELIUS_API_KEY", "env-key");
        env::set_var("HELIUS_BASE_URL", "http://127.0.0.1:9000");
        env::set_var("TRACKED_WALLETS", "A1,B2");
        env::set_var("POLL_INTERVAL_SECONDS", "5");
        env::set_var("LOG_LEVEL", "debug");
        env::set_var("TELEGRAM_BOT_TOKEN", "123:abc");
        env::set_var("TELEGRAM_CHAT_ID", "42");

        let mut config = AppConfig::default();
        config.apply_env_overrides().unwrap();

        assert_eq!(config.helius.api_key, "env-key");
        assert_eq!(config.helius.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.tracker.wallets, vec!["A1", "B2"]);
        assert_eq!(config.tracker.poll_interval_seconds, 5);
        assert_eq!(config.logging.level, "debug");
        assert!(config.telegram.enabled());
        assert_eq!(config.telegram.chat_id, "42");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_env_values() {
        clear_env();
        env::set_var("POLL_INTERVAL_SECONDS", "soon");

        let mut config = AppConfig::default();
        let result = config.apply_env_overrides();

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "POLL_INTERVAL_SECONDS"
        ));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_file_loading() {
        clear_env();
        let config_content = r#"
[helius]
api_key = "file-key"
base_url = "https://helius.example.com"
timeout_seconds = 15

[tracker]
wallets = ["Wallet111111", "Wallet222222"]
poll_interval_seconds = 20

[tracker.labels]
Wallet111111 = "Treasury"

[logging]
level = "warn"
format = "json"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut temp_file, config_content.as_bytes()).unwrap();

        let config = AppConfig::load(temp_file.path().to_str()).unwrap();

        assert_eq!(config.helius.api_key, "file-key");
        assert_eq!(config.helius.base_url, "https://helius.example.com");
        assert_eq!(config.helius.timeout_seconds, 15);
        assert_eq!(config.tracker.wallets, vec!["Wallet111111", "Wallet222222"]);
        assert_eq!(config.tracker.poll_interval_seconds, 20);
        assert_eq!(config.tracker.labels.get("Wallet111111").map(String::as_str), Some("Treasury"));
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    #[serial]
    fn test_partial_file_uses_defaults_and_env_wins() {
        clear_env();
        let config_content = r#"
[helius]
api_key = "file-key"

[tracker]
wallets = ["FromFile"]
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut temp_file, config_content.as_bytes()).unwrap();
        env::set_var("CONFIG_FILE", temp_file.path().to_str().unwrap());
        env::set_var("HELIUS_API_KEY", "env-key");

        let config = AppConfig::load(None).unwrap();

        assert_eq!(config.helius.api_key, "env-key");
        assert_eq!(config.helius.base_url, "https://api.helius.xyz");
        assert_eq!(config.tracker.wallets, vec!["FromFile"]);
        assert_eq!(config.tracker.poll_interval_seconds, 10);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_malformed_file_is_an_error() {
        clear_env();
        let mut temp_file = NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut temp_file, b"[tracker\nwallets = 3").unwrap();

        let result = AppConfig::load_from_file(temp_file.path().to_str().unwrap());
        assert!(matches!(result, Err(ConfigError::Parsing(_))));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = AppConfig::load_from_file("/nonexistent/tracker-config.toml").unwrap();
        assert_eq!(config.tracker.poll_interval_seconds, 10);
    }

    #[test]
    fn test_generate_sample_config() {
        let sample = AppConfig::generate_sample_config().unwrap();
        assert!(sample.contains("[helius]"));
        assert!(sample.contains("[tracker]"));
        assert!(sample.contains("[logging]"));
        assert!(sample.contains("[telegram]"));

        let parsed: AppConfig = toml::from_str(&sample).unwrap();
        assert!(parsed.validate().is_ok());
    }
}
