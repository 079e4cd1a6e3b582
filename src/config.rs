use crate::content::DEFAULT_POST_ID;
use anyhow::{anyhow, Context, Result};
use ethers::types::{Address, U256};
use std::env;

pub const DEFAULT_PAYMENT_ADDRESS: &str = "0x54DF84884b1aFc440c661f3f6DD82C8c0987395C";
pub const DEFAULT_EXPLORER_URL: &str = "https://api-sepolia.etherscan.io/api";

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub payment: PaymentConfig,
    pub explorer: ExplorerConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub post_id: u64,
    pub payment_address: Address,
    /// Smallest transfer, in wei, that counts as payment. Zero accepts any.
    pub min_payment_wei: U256,
}

#[derive(Clone)]
pub struct ExplorerConfig {
    pub api_url: String,
    pub api_key: String,
}

// Keep the key out of logs
impl std::fmt::Debug for ExplorerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplorerConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let payment_address = var("PAYMENT_ADDRESS", DEFAULT_PAYMENT_ADDRESS);
        let min_payment = var("MIN_PAYMENT_WEI", "0");

        Ok(Self {
            server: ServerConfig {
                host: var("HOST", "0.0.0.0"),
                port: var("PORT", "3001").parse().context("PORT must be a port number")?,
                cors_allowed_origins: var("ALLOWED_ORIGINS", "http://localhost:3000")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            payment: PaymentConfig {
                post_id: var("POST_ID", &DEFAULT_POST_ID.to_string())
                    .parse()
                    .context("POST_ID must be an unsigned integer")?,
                payment_address: payment_address.trim().parse().map_err(|_| {
                    anyhow!("PAYMENT_ADDRESS {:?} is not an address", payment_address)
                })?,
                min_payment_wei: U256::from_dec_str(min_payment.trim()).map_err(|_| {
                    anyhow!("MIN_PAYMENT_WEI {:?} is not a wei amount", min_payment)
                })?,
            },
            explorer: ExplorerConfig {
                api_url: var("ETHERSCAN_API_URL", DEFAULT_EXPLORER_URL),
                api_key: lookup("ETHERSCAN_API_KEY").unwrap_or_default(),
            },
        })
    }
}
