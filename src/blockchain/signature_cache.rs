use std::collections::HashMap;

use crate::error::MonitorError;

/// Last-seen signature per tracked wallet.
///
/// Every configured wallet has exactly one entry, starting absent. Entries are
/// never added after construction.
#[derive(Debug, Clone, Default)]
pub struct SignatureCache {
    entries: HashMap<String, Option<String>>,
}

impl SignatureCache {
    pub fn new<I, S>(wallets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: wallets.into_iter().map(|w| (w.into(), None)).collect(),
        }
    }

    pub fn last_seen(&self, address: &str) -> Option<&str> {
        self.entries.get(address).and_then(|sig| sig.as_deref())
    }

    pub fn contains(&self, address: &str) -> bool {
        self.entries.contains_key(address)
    }

    /// True when `signature` differs from the stored entry, including when the
    /// entry is still absent
    pub fn is_new(&self, address: &str, signature: &str) -> bool {
        self.last_seen(address) != Some(signature)
    }

    /// Store a signature, returning the previous one
    pub fn record(&mut self, address: &str, signature: &str) -> Result<Option<String>, MonitorError> {
        let entry = self
            .entries
            .get_mut(address)
            .ok_or_else(|| MonitorError::UnknownWallet(address.to_string()))?;
        Ok(entry.replace(signature.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_absent_for_every_wallet() {
        let cache = SignatureCache::new(["W1", "W2"]);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.last_seen("W1"), None);
        assert_eq!(cache.last_seen("W2"), None);
        assert!(cache.is_new("W1", "S1"));
    }

    #[test]
    fn test_record_and_compare() {
        let mut cache = SignatureCache::new(["W1", "W2"]);

        assert_eq!(cache.record("W1", "S1").unwrap(), None);
        assert!(!cache.is_new("W1", "S1"));
        assert!(cache.is_new("W1", "S2"));
        assert_eq!(cache.last_seen("W2"), None);

        assert_eq!(cache.record("W1", "S2").unwrap(), Some("S1".to_string()));
        assert_eq!(cache.last_seen("W1"), Some("S2"));
    }

    #[test]
    fn test_unknown_wallet_is_rejected() {
        let mut cache = SignatureCache::new(["W1"]);
        let result = cache.record("W9", "S1");

        assert!(matches!(result, Err(MonitorError::UnknownWallet(w)) if w == "W9"));
        assert!(!cache.contains("W9"));
        assert_eq!(cache.len(), 1);
    }
}
