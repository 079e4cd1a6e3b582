//! Block-explorer lookups used as payment evidence.
//!
//! The service never talks to a node directly. Whether a reader paid is
//! derived from the transaction list an Etherscan-compatible API reports for
//! the payment address.

pub mod etherscan;

use crate::types::{ExplorerError, ExplorerTransaction};
use crate::utils::hex_eq;
use async_trait::async_trait;
use ethers::types::{Address, U256};

pub use etherscan::EtherscanClient;

/// Anything that can list the transactions sent to an address.
#[async_trait]
pub trait TransactionSource: Send + Sync + 'static {
    async fn incoming_transactions(
        &self,
        recipient: Address,
    ) -> Result<Vec<ExplorerTransaction>, ExplorerError>;
}

/// Finds a successful transaction sent by `reader` carrying `expected_hash`
/// as its input data and moving at least `min_value` wei. A zero minimum
/// accepts any amount.
pub fn find_matching_payment<'a>(
    transactions: &'a [ExplorerTransaction],
    reader: &str,
    expected_hash: &str,
    min_value: U256,
) -> Option<&'a ExplorerTransaction> {
    transactions.iter().find(|tx| {
        !tx.failed()
            && hex_eq(&tx.from, reader)
            && hex_eq(&tx.input, expected_hash)
            && tx.pays_at_least(min_value)
    })
}
