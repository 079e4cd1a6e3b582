use crate::types::WalletError;
use async_trait::async_trait;
use ethers::prelude::{
    Http, LocalWallet, Middleware, PendingTransaction, Provider, Signer, SignerMiddleware,
    TransactionRequest,
};
use ethers::types::{Address, Bytes, Signature, H256, U256, U64};
use tracing::{debug, info};

/// A value transfer carrying the payment hash as calldata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentRequest {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

/// The capabilities a reader session needs from a wallet.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Asks the wallet to expose its accounts. The first is the selected one.
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// EIP-191 personal-message signature.
    async fn sign_message(&self, message: &str) -> Result<Signature, WalletError>;

    async fn send_payment(&self, payment: &PaymentRequest) -> Result<H256, WalletError>;

    /// Resolves once the transaction is mined successfully.
    async fn wait_for_confirmation(&self, tx_hash: H256) -> Result<(), WalletError>;
}

/// Wallet backed by a local private key and a JSON-RPC node.
pub struct LocalKeyWallet {
    client: SignerMiddleware<Provider<Http>, LocalWallet>,
}

fn provider_error(e: impl std::fmt::Display) -> WalletError {
    WalletError::Provider(e.to_string())
}

impl LocalKeyWallet {
    /// Connects to `rpc_url` and signs for the chain it reports.
    pub async fn connect(rpc_url: &str, private_key: &str) -> Result<Self, WalletError> {
        let provider = Provider::<Http>::try_from(rpc_url).map_err(provider_error)?;
        let chain_id = provider.get_chainid().await.map_err(provider_error)?;
        Self::with_chain_id(provider, private_key, chain_id.as_u64())
    }

    pub fn with_chain_id(
        provider: Provider<Http>,
        private_key: &str,
        chain_id: u64,
    ) -> Result<Self, WalletError> {
        let signer = private_key
            .trim()
            .trim_start_matches("0x")
            .parse::<LocalWallet>()
            .map_err(|e| WalletError::Provider(format!("invalid private key: {}", e)))?
            .with_chain_id(chain_id);

        info!("Using wallet {:?} on chain {}", signer.address(), chain_id);

        Ok(Self {
            client: SignerMiddleware::new(provider, signer),
        })
    }

    pub fn address(&self) -> Address {
        self.client.signer().address()
    }
}

#[async_trait]
impl Wallet for LocalKeyWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(vec![self.address()])
    }

    async fn sign_message(&self, message: &str) -> Result<Signature, WalletError> {
        self.client
            .signer()
            .sign_message(message)
            .await
            .map_err(|e| WalletError::Rejected(e.to_string()))
    }

    async fn send_payment(&self, payment: &PaymentRequest) -> Result<H256, WalletError> {
        let tx = TransactionRequest::new()
            .to(payment.to)
            .value(payment.value)
            .data(payment.data.clone());

        let pending = self
            .client
            .send_transaction(tx, None)
            .await
            .map_err(provider_error)?;

        let tx_hash = pending.tx_hash();
        debug!("Submitted payment transaction {:?}", tx_hash);
        Ok(tx_hash)
    }

    async fn wait_for_confirmation(&self, tx_hash: H256) -> Result<(), WalletError> {
        let receipt = PendingTransaction::new(tx_hash, self.client.provider())
            .await
            .map_err(provider_error)?;

        match receipt {
            Some(receipt) if receipt.status == Some(U64::from(1)) => {
                debug!("Transaction {:?} mined in block {:?}", tx_hash, receipt.block_number);
                Ok(())
            }
            _ => Err(WalletError::TransactionFailed(format!("{:?}", tx_hash))),
        }
    }
}
