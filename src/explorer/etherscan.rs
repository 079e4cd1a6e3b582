use super::TransactionSource;
use crate::types::{ExplorerError, ExplorerResponse, ExplorerResult, ExplorerTransaction};
use async_trait::async_trait;
use ethers::types::Address;
use tracing::debug;

/// Client for the Etherscan `account/txlist` endpoint.
#[derive(Clone)]
pub struct EtherscanClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl EtherscanClient {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl TransactionSource for EtherscanClient {
    async fn incoming_transactions(
        &self,
        recipient: Address,
    ) -> Result<Vec<ExplorerTransaction>, ExplorerError> {
        let address = format!("{:?}", recipient);
        debug!("Fetching explorer txlist for {}", address);

        let body = self
            .http
            .get(&self.api_url)
            .query(&[
                ("module", "account"),
                ("action", "txlist"),
                ("address", address.as_str()),
                ("startblock", "0"),
                ("endblock", "99999999"),
                // txlist returns at most 10k rows; newest first keeps recent payments in range
                ("sort", "desc"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let response: ExplorerResponse = serde_json::from_str(&body)?;

        // "No transactions found" comes back as status 0 with an empty list
        match response.result {
            ExplorerResult::Transactions(transactions) => {
                debug!("Explorer returned {} transactions", transactions.len());
                Ok(transactions)
            }
            ExplorerResult::Message(detail) => Err(ExplorerError::Rejected(format!(
                "{}: {}",
                response.message, detail
            ))),
        }
    }
}
