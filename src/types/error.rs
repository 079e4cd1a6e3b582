use thiserror::Error;

/// Rejections of reader-supplied identity or hash requests.
///
/// Carried inside request extensions, so it has to stay `Clone`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlogError {
    #[error("No address was received.")]
    MissingAddress,
    #[error("A signature is required to check payment.")]
    MissingSignature,
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Malformed signature")]
    MalformedSignature,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Malformed query string")]
    MalformedQuery,
}

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("Explorer request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Explorer returned an error: {0}")]
    Rejected(String),
    #[error("Malformed explorer response: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Request rejected by wallet: {0}")]
    Rejected(String),
    #[error("Wallet provider error: {0}")]
    Provider(String),
    #[error("Transaction {0} was dropped or reverted")]
    TransactionFailed(String),
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error("Article service request failed: {0}")]
    Api(#[from] reqwest::Error),
    #[error("Article service refused to issue a payment hash: {0}")]
    HashRefused(String),
    #[error("Malformed payment hash: {0}")]
    MalformedHash(String),
    #[error("No wallet account is connected")]
    NotConnected,
}
