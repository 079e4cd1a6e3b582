use ethers::types::U256;
use serde::{Deserialize, Serialize};

/// One entry of an Etherscan-style `txlist` result. Fields the service does
/// not look at are ignored on deserialization.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerTransaction {
    pub hash: String,
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub input: String,
    #[serde(rename = "isError", default)]
    pub is_error: String,
}

impl ExplorerTransaction {
    pub fn failed(&self) -> bool {
        self.is_error == "1"
    }

    /// Whether the transferred wei amount reaches `minimum`. An unreadable
    /// value only passes a zero minimum.
    pub fn pays_at_least(&self, minimum: U256) -> bool {
        match U256::from_dec_str(self.value.trim()) {
            Ok(value) => value >= minimum,
            Err(_) => minimum.is_zero(),
        }
    }
}

/// The explorer reports errors in-band: `result` is a string in that case.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExplorerResult {
    Transactions(Vec<ExplorerTransaction>),
    Message(String),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExplorerResponse {
    pub status: String,
    pub message: String,
    pub result: ExplorerResult,
}
