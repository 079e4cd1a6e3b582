use crate::utils::normalize_address;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

/// In-memory record of payments already proven on-chain, keyed by
/// `(post_id, lowercase reader address)`. Lives as long as the process.
#[derive(Clone, Default)]
pub struct PaidLedger {
    entries: Arc<RwLock<HashMap<(u64, String), String>>>,
}

impl PaidLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transaction hash of the recorded payment, if any.
    pub async fn payment_for(&self, post_id: u64, address: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries.get(&(post_id, normalize_address(address))).cloned()
    }

    /// Returns `false` if the reader already had a payment recorded.
    pub async fn record(&self, post_id: u64, address: &str, tx_hash: &str) -> bool {
        let mut entries = self.entries.write().await;
        let key = (post_id, normalize_address(address));
        if entries.contains_key(&key) {
            return false;
        }
        entries.insert(key, tx_hash.to_string());
        true
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
