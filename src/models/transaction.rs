use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Label used when the API omits a transaction type
pub const UNKNOWN_TRANSACTION_TYPE: &str = "Unknown";

/// One element of the Helius address-transactions response.
///
/// Only `signature` and `type` drive tracking. Every other field is kept
/// untyped in `extra`, so a field the API changes shape on never fails a fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TransactionSummary {
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(rename = "type", default)]
    pub tx_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TransactionSummary {
    pub fn new(signature: &str, tx_type: Option<&str>) -> Self {
        Self {
            signature: Some(signature.to_string()),
            tx_type: tx_type.map(str::to_string),
            ..Self::default()
        }
    }

    /// The signature, if present and non-empty
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref().filter(|s| !s.is_empty())
    }

    /// The type label, falling back to `Unknown`
    pub fn type_label(&self) -> &str {
        self.tx_type.as_deref().unwrap_or(UNKNOWN_TRANSACTION_TYPE)
    }

    pub fn timestamp(&self) -> Option<i64> {
        self.extra.get("timestamp").and_then(Value::as_i64)
    }

    pub fn description(&self) -> Option<&str> {
        self.extra.get("description").and_then(Value::as_str)
    }
}
