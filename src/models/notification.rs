use chrono::{DateTime, Local};
use std::fmt;

const SOLSCAN_TX_URL: &str = "https://solscan.io/tx/";

/// A newly observed transaction for one tracked wallet
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub observed_at: DateTime<Local>,
    pub address: String,
    pub tx_type: String,
    pub signature: String,
    /// Display name configured for the wallet, if any
    pub label: Option<String>,
}

impl Notification {
    pub fn new(address: &str, tx_type: &str, signature: &str) -> Self {
        Self {
            observed_at: Local::now(),
            address: address.to_string(),
            tx_type: tx_type.to_string(),
            signature: signature.to_string(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: Option<&str>) -> Self {
        self.label = label.map(str::to_string);
        self
    }

    /// The label when set, otherwise the redacted address
    pub fn wallet_name(&self) -> String {
        self.label.clone().unwrap_or_else(|| redact_address(&self.address))
    }

    pub fn viewer_url(&self) -> String {
        solscan_url(&self.signature)
    }
}

/// Renders the console block, starting with a blank line
impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", self.observed_at.format("%Y-%m-%d %H:%M:%S"))?;
        match &self.label {
            Some(label) => writeln!(f, "New transaction for wallet {} ({})", redact_address(&self.address), label)?,
            None => writeln!(f, "New transaction for wallet {}", redact_address(&self.address))?,
        }
        writeln!(f, "Type: {}", self.tx_type)?;
        writeln!(f, "Signature: {}", self.signature)?;
        write!(f, "View on Solscan: {}", self.viewer_url())
    }
}

/// First four and last four characters joined by `...`
pub fn redact_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    let head: String = chars.iter().take(4).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{}...{}", head, tail)
}

pub fn solscan_url(signature: &str) -> String {
    format!("{}{}", SOLSCAN_TX_URL, signature)
}
