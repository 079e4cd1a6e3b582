//! Terminal reader: prints the preview, pays with a local key, prints the
//! unlocked article.

use clap::Parser;
use ethers::types::{Address, U256};
use paywall_blog::{
    client::{
        session::{DEFAULT_PRICE_WEI, MISSING_FULL_POST},
        ArticleApi, LocalKeyWallet, PaymentOutcome, ReaderConfig, ReaderSession,
    },
    config::DEFAULT_PAYMENT_ADDRESS,
};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "reader", about = "Pay for and read the article")]
struct Cli {
    /// Article service base URL.
    #[arg(long, env = "ARTICLE_SERVICE_URL", default_value = "http://localhost:3001")]
    server_url: String,

    /// JSON-RPC endpoint used to send the payment.
    #[arg(long, env = "RPC_URL", default_value = "http://localhost:8545")]
    rpc_url: String,

    /// Hex private key of the paying account.
    #[arg(long, env = "READER_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    #[arg(long, env = "PAYMENT_ADDRESS", default_value = DEFAULT_PAYMENT_ADDRESS)]
    payment_address: String,

    /// Price in wei.
    #[arg(long, env = "PRICE_WEI", default_value_t = DEFAULT_PRICE_WEI)]
    price_wei: u64,

    /// Seconds to wait after confirmation before asking for the article again.
    #[arg(long, env = "CONFIRMATION_DELAY_SECS", default_value_t = 15)]
    confirmation_delay_secs: u64,

    /// Stop after printing the preview.
    #[arg(long)]
    preview_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env may carry RUST_LOG, so it is loaded before the filter is built
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paywall_blog=info,reader=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let api = ArticleApi::new(&cli.server_url);
    let preview = api.fetch_article(None).await?;
    println!("Preview: {}\n\n{}\n", preview.title, preview.preview);

    if cli.preview_only {
        return Ok(());
    }

    let private_key = cli.private_key.ok_or_else(|| {
        anyhow::anyhow!("a private key is required to pay (--private-key or READER_PRIVATE_KEY)")
    })?;
    let wallet = LocalKeyWallet::connect(&cli.rpc_url, &private_key).await?;

    let payment_address: Address = cli
        .payment_address
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid payment address {:?}", cli.payment_address))?;

    let config = ReaderConfig {
        payment_address,
        price: U256::from(cli.price_wei),
        confirmation_delay: Duration::from_secs(cli.confirmation_delay_secs),
    };

    let mut session = ReaderSession::new(api, wallet, config);
    session.load().await?;
    let address = session
        .connect()
        .await?
        .ok_or_else(|| anyhow::anyhow!("wallet exposed no accounts"))?;
    info!("Connected as {}", address);

    match session.pay().await? {
        PaymentOutcome::AlreadyPaid => info!("Payment found from an earlier session"),
        PaymentOutcome::Unlocked { tx_hash } => info!("Unlocked by transaction {:?}", tx_hash),
        PaymentOutcome::Pending { tx_hash } => {
            println!(
                "Transaction {:?} is confirmed but not indexed yet; run again shortly.",
                tx_hash
            );
            return Ok(());
        }
    }

    let title = session.page_title().unwrap_or_default();
    let content = session.content().unwrap_or(MISSING_FULL_POST);
    println!("{}\n\n{}", title, content);

    Ok(())
}
