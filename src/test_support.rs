//! Fixtures shared by the unit tests.

use crate::{
    explorer::TransactionSource,
    types::{ExplorerError, ExplorerTransaction},
};
use async_trait::async_trait;
use ethers::{signers::LocalWallet, types::Address};
use std::str::FromStr;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

pub const PAYMENT_ADDRESS: &str = "0x54DF84884b1aFc440c661f3f6DD82C8c0987395C";

pub fn create_test_wallet() -> LocalWallet {
    LocalWallet::from_str("1234567890123456789012345678901234567890123456789012345678901234")
        .unwrap()
}

pub fn payment_address() -> Address {
    Address::from_str(PAYMENT_ADDRESS).unwrap()
}

pub fn paid_tx(from: &str, input: &str) -> ExplorerTransaction {
    ExplorerTransaction {
        hash: format!("0x{}", "fe".repeat(32)),
        from: from.to_lowercase(),
        to: PAYMENT_ADDRESS.to_lowercase(),
        value: "10000000000000".to_string(),
        input: input.to_lowercase(),
        is_error: "0".to_string(),
    }
}

/// Explorer double whose transaction list tests can edit while it is shared.
#[derive(Clone, Default)]
pub struct StubExplorer {
    pub transactions: Arc<Mutex<Vec<ExplorerTransaction>>>,
    pub fail: Arc<AtomicBool>,
    pub calls: Arc<AtomicUsize>,
}

impl StubExplorer {
    pub fn push(&self, tx: ExplorerTransaction) {
        self.transactions.lock().unwrap().push(tx);
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransactionSource for StubExplorer {
    async fn incoming_transactions(
        &self,
        _recipient: Address,
    ) -> Result<Vec<ExplorerTransaction>, ExplorerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ExplorerError::Rejected("NOTOK: Max rate limit reached".into()));
        }
        Ok(self.transactions.lock().unwrap().clone())
    }
}
