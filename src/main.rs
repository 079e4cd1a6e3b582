use paywall_blog::{
    config::Config, content, create_router, explorer::EtherscanClient, middleware::apply_cors,
    AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env may carry RUST_LOG, so it is loaded before the filter is built
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paywall_blog=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config);

    if config.explorer.api_key.is_empty() {
        warn!("ETHERSCAN_API_KEY is not set; explorer lookups may be throttled or refused");
    }

    let explorer = EtherscanClient::new(&config.explorer.api_url, &config.explorer.api_key);
    let state = AppState::new(
        content::article(config.payment.post_id),
        config.payment.payment_address,
        explorer,
    )
    .with_min_payment(config.payment.min_payment_wei);

    let app = apply_cors(create_router(state), &config.server.cors_allowed_origins);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Serving post {} on {}", config.payment.post_id, addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
