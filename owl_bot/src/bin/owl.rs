use anyhow::Context;
use clap::{Parser, Subcommand};
use forecast_trade::{CsvProvider, MarketDataProvider, StrategyKind};
use owl_bot::report::{self, Section};
use owl_bot::{
    BotConfig, Dispatcher, ForecastService, HttpMarketData, NewsProvider, RssNews,
    StdoutResponder,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Read closes from a `symbol,date,close` CSV instead of the network
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price, trend, forecast, suggestion and headlines for one symbol
    Report { symbol: String },
    /// Estimate the next close
    Predict {
        symbol: String,

        /// lstm, naive or mean-reversion
        #[arg(short, long, default_value = "lstm")]
        strategy: String,

        /// Days of history to fetch instead of the configured lookback
        #[arg(long)]
        days: Option<usize>,
    },
    /// Direction of the last week
    Trend {
        symbol: String,

        /// Calendar days to look back (default 7)
        #[arg(long)]
        days: Option<usize>,
    },
    /// Buy/avoid call against the trailing mean
    Suggest {
        symbol: String,

        /// Calendar days to average over (default 10)
        #[arg(long)]
        days: Option<usize>,
    },
    /// Interactive session reading chat messages from stdin
    Chat,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Setup logging
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let cli = Cli::parse();
    let config = BotConfig::from_env().context("Invalid OWL_* configuration")?;

    let provider: Arc<dyn MarketDataProvider> = match &cli.csv {
        Some(path) => Arc::new(
            CsvProvider::from_path(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
        ),
        None => Arc::new(HttpMarketData::new(&config)),
    };
    let news: Option<Arc<dyn NewsProvider>> = match (&cli.csv, &config.news_feed_url) {
        (None, Some(url)) => Some(Arc::new(RssNews::new(url.clone(), config.http_timeout))),
        _ => None,
    };

    let mut service = ForecastService::from_config(&config, provider.clone())?;
    if let Some(news) = news.clone() {
        service = service.with_news(news, config.news_limit);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;
    let outcome = runtime.block_on(run(cli.command, Arc::new(service)));

    // blocking HTTP clients must not be dropped inside the runtime
    drop(runtime);
    drop(news);
    drop(provider);
    outcome
}

async fn run(command: Commands, service: Arc<ForecastService>) -> anyhow::Result<()> {
    match command {
        Commands::Report { symbol } => {
            println!("{}", service.full_report(&symbol, &Section::FULL).await);
        }
        Commands::Predict {
            symbol,
            strategy,
            days,
        } => {
            let kind: StrategyKind = strategy.parse()?;
            let result = service.forecast(&symbol, kind, days).await?;
            println!("{}", report::format_prediction(&result));
        }
        Commands::Trend { symbol, days } => {
            let trend = service.trend(&symbol, days).await?;
            println!("{}", report::format_trend(&trend));
        }
        Commands::Suggest { symbol, days } => {
            let suggestion = service.suggestion(&symbol, days).await?;
            println!("{}", report::format_suggestion(&symbol.to_uppercase(), suggestion));
        }
        Commands::Chat => {
            let dispatcher = Dispatcher::new(service, StdoutResponder);
            dispatcher.handle(0, "/start").await?;

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                if line.trim().is_empty() {
                    continue;
                }
                dispatcher.handle(0, &line).await?;
            }
        }
    }
    Ok(())
}
