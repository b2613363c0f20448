use anyhow::Context;
use clap::Parser;
use market_checker::chain::JsonRpcConnector;
use market_checker::logs::EtherscanLogSource;
use market_checker::price::{CoingeckoFeed, RetryingPriceReference};
use market_checker::{api, Config, MarketRiskService};
use std::net::SocketAddr;
use std::sync::Arc;

/// Compare a lending market's live configuration with a forked network
/// where a governance proposal has been executed.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Run the HTTP API instead of a one-off analysis
    #[arg(long)]
    serve: bool,

    /// Port for the HTTP API [default: PORT or 5000]
    #[arg(long, short = 'p')]
    port: Option<u16>,

    /// Market address to analyze
    #[arg(long, short = 'm', env = "MARKET_ADDRESS")]
    market: Option<String>,

    /// Fork (virtual network) id the proposal was executed on
    #[arg(long, short = 'v', env = "VNET_ID")]
    vnet: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Configuration error")?;
    let service = Arc::new(build_service(&config));

    if cli.serve {
        serve(service, &config, cli.port.unwrap_or(config.port)).await
    } else {
        let market = cli.market.context(
            "Market address is required. Provide it with --market or set MARKET_ADDRESS",
        )?;
        let vnet = cli
            .vnet
            .context("Fork network id is required. Provide it with --vnet or set VNET_ID")?;

        let report = service.analyze_market(&market, &vnet).await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }
}

fn build_service(config: &Config) -> MarketRiskService {
    let client = reqwest::Client::new();

    let connector = JsonRpcConnector::new(
        client.clone(),
        config.rpc_mainnet.clone(),
        config.fork_rpc_url_template.clone(),
        config.rpc_fork.clone(),
    );
    let logs = EtherscanLogSource::new(
        client.clone(),
        config.etherscan_api_url.clone(),
        config.etherscan_api_key.clone(),
        config.etherscan_chain_id,
        config.etherscan_page_delay,
    );
    let prices = RetryingPriceReference::new(
        CoingeckoFeed::new(
            client,
            config.coingecko_api_url.clone(),
            config.coingecko_api_key.clone(),
            config.coingecko_platform.clone(),
        ),
        config.price_rate_limit_retries,
        config.price_rate_limit_delay,
    );

    MarketRiskService::new(
        Arc::new(connector),
        Arc::new(logs),
        Arc::new(prices),
        config.contracts,
    )
}

async fn serve(service: Arc<MarketRiskService>, config: &Config, port: u16) -> anyhow::Result<()> {
    let app = api::create_router(api::AppState::new(service));

    let addr: SocketAddr = format!("{}:{}", config.host, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.host, port))?;
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")
}
