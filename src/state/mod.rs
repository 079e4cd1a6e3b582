pub mod ledger;

pub use ledger::PaidLedger;

use crate::{
    explorer::{find_matching_payment, TransactionSource},
    types::Article,
    utils::payment_hash,
};
use ethers::types::{Address, U256};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppState {
    article: Arc<Article>,
    payment_address: Address,
    min_payment: U256,
    ledger: PaidLedger,
    explorer: Arc<dyn TransactionSource>,
}

impl AppState {
    pub fn new(article: Article, payment_address: Address, explorer: impl TransactionSource) -> Self {
        Self {
            article: Arc::new(article),
            payment_address,
            min_payment: U256::zero(),
            ledger: PaidLedger::new(),
            explorer: Arc::new(explorer),
        }
    }

    /// Payments below `min_payment` wei do not unlock the article.
    pub fn with_min_payment(mut self, min_payment: U256) -> Self {
        self.min_payment = min_payment;
        self
    }

    pub fn article(&self) -> &Article {
        &self.article
    }

    pub fn ledger(&self) -> &PaidLedger {
        &self.ledger
    }

    pub fn payment_hash_for(&self, address: &str) -> String {
        payment_hash(self.article.id, address)
    }

    /// Whether `address` has paid for the article.
    ///
    /// Explorer failures count as "not paid yet" and are only logged.
    pub async fn has_paid(&self, address: &str) -> bool {
        let post_id = self.article.id;

        if let Some(tx_hash) = self.ledger.payment_for(post_id, address).await {
            debug!("Payment for {} already recorded in {}", address, tx_hash);
            return true;
        }

        let expected = self.payment_hash_for(address);
        let transactions = match self.explorer.incoming_transactions(self.payment_address).await {
            Ok(transactions) => transactions,
            Err(e) => {
                warn!("Explorer lookup failed, serving preview to {}: {}", address, e);
                return false;
            }
        };

        match find_matching_payment(&transactions, address, &expected, self.min_payment) {
            Some(tx) => {
                info!("Found payment from {} in transaction {}", address, tx.hash);
                self.ledger.record(post_id, address, &tx.hash).await;
                true
            }
            None => {
                debug!("No payment from {} with data {} yet", address, expected);
                false
            }
        }
    }
}
