use log::{info, warn, error, debug, trace};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Instant;

use crate::config::LoggingConfig;
use crate::error::{Result, TrackerError};

/// Structured logging context for the tracker
pub struct LogContext {
    pub component: String,
    pub operation: String,
    pub metadata: BTreeMap<String, Value>,
}

impl LogContext {
    pub fn new(component: &str, operation: &str) -> Self {
        Self {
            component: component.to_string(),
            operation: operation.to_string(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    pub fn with_address(self, address: &str) -> Self {
        self.with_metadata("address", json!(address))
    }

    pub fn with_signature(self, signature: &str) -> Self {
        self.with_metadata("signature", json!(signature))
    }

    pub fn with_duration_ms(self, duration_ms: u64) -> Self {
        self.with_metadata("duration_ms", json!(duration_ms))
    }

    fn format_message(&self, message: &str) -> String {
        let mut log_entry = json!({
            "component": self.component,
            "operation": self.operation,
            "message": message,
        });

        for (key, value) in &self.metadata {
            log_entry[key] = value.clone();
        }

        log_entry.to_string()
    }

    pub fn info(&self, message: &str) {
        info!("{}", self.format_message(message));
    }

    pub fn warn(&self, message: &str) {
        warn!("{}", self.format_message(message));
    }

    pub fn error(&self, message: &str) {
        error!("{}", self.format_message(message));
    }

    pub fn debug(&self, message: &str) {
        debug!("{}", self.format_message(message));
    }

    pub fn trace(&self, message: &str) {
        trace!("{}", self.format_message(message));
    }
}

/// Times one operation
pub struct PerformanceMonitor {
    start_time: Instant,
    operation: String,
    metadata: BTreeMap<String, Value>,
}

impl PerformanceMonitor {
    pub fn new(operation: &str) -> Self {
        Self {
            start_time: Instant::now(),
            operation: operation.to_string(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// Log the completed operation at trace level and return its duration.
    ///
    /// Failed operations are not finished here; the caller reports them once.
    pub fn finish(self) -> u64 {
        let duration = self.elapsed_ms();

        let mut context = LogContext::new("performance", &self.operation)
            .with_duration_ms(duration);

        for (key, value) in self.metadata {
            context = context.with_metadata(&key, value);
        }

        context.trace(&format!("Operation completed successfully in {}ms", duration));
        duration
    }
}

/// Application metrics
pub struct MetricsLogger;

impl MetricsLogger {
    pub fn log_api_call(endpoint: &str, duration_ms: u64, transaction_count: usize) {
        let context = LogContext::new("metrics", "api_call")
            .with_metadata("endpoint", json!(endpoint))
            .with_duration_ms(duration_ms)
            .with_metadata("transaction_count", json!(transaction_count));

        context.debug(&format!("API call {} completed in {}ms", endpoint, duration_ms));
    }

    pub fn log_cycle_completed(
        cycle: u64,
        wallets: usize,
        notifications: usize,
        failures: usize,
        duration_ms: u64,
    ) {
        let context = LogContext::new("metrics", "cycle_completed")
            .with_metadata("cycle", json!(cycle))
            .with_metadata("wallets", json!(wallets))
            .with_metadata("notifications", json!(notifications))
            .with_metadata("failures", json!(failures))
            .with_duration_ms(duration_ms);

        context.debug(&format!(
            "Cycle {} checked {} wallets: {} new, {} failed",
            cycle, wallets, notifications, failures
        ));
    }
}

/// Render a structured log message for the `pretty` format.
///
/// Returns `None` when the message is not one of our JSON entries.
pub fn render_pretty(message: &str) -> Option<String> {
    let Value::Object(mut entry) = serde_json::from_str::<Value>(message).ok()? else {
        return None;
    };

    let component = take_string(&mut entry, "component")?;
    let operation = take_string(&mut entry, "operation")?;
    let text = take_string(&mut entry, "message")?;

    let mut rendered = format!("{}::{}: {}", component, operation, text);
    for (key, value) in entry {
        match value {
            Value::String(s) => rendered.push_str(&format!(" {}={}", key, s)),
            other => rendered.push_str(&format!(" {}={}", key, other)),
        }
    }
    Some(rendered)
}

/// Render a log record as a single JSON line for the `json` format
pub fn render_json(timestamp: &str, level: log::Level, target: &str, message: &str) -> String {
    let mut entry = match serde_json::from_str::<Value>(message) {
        Ok(Value::Object(map)) => map,
        _ => {
            let mut map = Map::new();
            map.insert("message".to_string(), json!(message));
            map
        }
    };
    entry.insert("timestamp".to_string(), json!(timestamp));
    entry.insert("level".to_string(), json!(level.to_string()));
    entry.insert("target".to_string(), json!(target));

    Value::Object(entry).to_string()
}

fn take_string(entry: &mut Map<String, Value>, key: &str) -> Option<String> {
    match entry.remove(key)? {
        Value::String(s) => Some(s),
        _ => None,
    }
}

/// Initialize logging for the application.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let json_format = config.format == "json";

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.level.as_str()))
        .format(move |buf, record| {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();
            let message = record.args().to_string();

            if json_format {
                writeln!(buf, "{}", render_json(&timestamp, record.level(), record.target(), &message))
            } else {
                let body = render_pretty(&message).unwrap_or(message);
                writeln!(buf, "{} [{}] {}", timestamp, record.level(), body)
            }
        })
        .try_init()
        .map_err(|e| TrackerError::Logging(e.to_string()))?;

    debug!("Logging initialized ({} format)", config.format);
    Ok(())
}
