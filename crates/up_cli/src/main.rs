use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use up_core::config::mask_secret;
use up_core::{Config, ModelProvider, RetryPolicy};
use up_inference::create_model;
use up_scrapers::{create_search_providers, HttpFetcher, Pipeline};
use up_storage::{create_store, ArticleTarget};

#[derive(Debug, Clone, Copy, PartialEq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_millis = 0u64;
        let mut current_number = String::new();
        let mut has_value = false;
        let mut chars = s.trim().chars().peekable();

        while let Some(c) = chars.next() {
            if c.is_ascii_digit() {
                current_number.push(c);
                continue;
            }
            if c.is_whitespace() {
                continue;
            }
            let num = current_number
                .parse::<u64>()
                .map_err(|_| format!("Invalid duration: {}", s))?;
            let unit_millis = match c {
                'm' if chars.peek() == Some(&'s') => {
                    chars.next();
                    1
                }
                's' => 1000,
                'm' => 60_000,
                'h' => 3_600_000,
                _ => return Err(format!("Invalid duration unit: {}", c)),
            };
            total_millis = add_millis(total_millis, num, unit_millis)?;
            current_number.clear();
            has_value = true;
        }

        // Bare numbers are seconds
        if !current_number.is_empty() {
            let num = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_millis = add_millis(total_millis, num, 1000)?;
            has_value = true;
        }

        if !has_value || total_millis == 0 {
            return Err("Duration must be a positive number".to_string());
        }
        Ok(HumanDuration(Duration::from_millis(total_millis)))
    }
}

fn add_millis(total: u64, num: u64, unit_millis: u64) -> std::result::Result<u64, String> {
    num.checked_mul(unit_millis)
        .and_then(|millis| total.checked_add(millis))
        .ok_or_else(|| "Duration too large".to_string())
}

/// Enhances the latest (or a chosen) article with researched reference content.
#[derive(Parser, Debug)]
#[command(name = "content-upgrader", author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the articles REST API (e.g. http://localhost:8000/api)
    #[arg(long, env = "ARTICLES_API_BASE_URL")]
    api_base_url: Option<String>,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    #[arg(long, env = "GOOGLE_SEARCH_API_KEY", hide_env_values = true)]
    search_api_key: Option<String>,

    #[arg(long, env = "GOOGLE_SEARCH_ENGINE_ID")]
    search_engine_id: Option<String>,

    /// Comma separated model identifiers, tried in order
    #[arg(long, env = "GEMINI_MODELS")]
    models: Option<String>,

    /// Inference backend. Available: gemini (default), dummy
    #[arg(long, env = "MODEL_PROVIDER", default_value = "gemini")]
    model_provider: String,

    /// Enhance this article instead of the latest one
    #[arg(long, env = "ARTICLE_ID")]
    article_id: Option<u64>,

    /// Timeout for API, search and page requests (e.g. 10, 10s, 1m)
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value = "10s")]
    http_timeout: HumanDuration,

    #[arg(long, env = "MODEL_TIMEOUT_SECS", default_value = "30s")]
    model_timeout: HumanDuration,

    /// Attempts for the article listing and source page fetches
    #[arg(long, env = "FETCH_ATTEMPTS", default_value_t = 3)]
    fetch_attempts: u32,

    #[arg(long, env = "GEMINI_API_URL")]
    model_api_url: Option<String>,

    #[arg(long, env = "GOOGLE_SEARCH_API_URL")]
    search_api_url: Option<String>,

    #[arg(long, env = "FALLBACK_SEARCH_URL")]
    fallback_search_url: Option<String>,
}

impl Cli {
    fn into_config(self) -> up_core::Result<Config> {
        let mut config = Config {
            api_base_url: self.api_base_url.unwrap_or_default(),
            model_api_key: self.gemini_api_key.filter(|k| !k.trim().is_empty()),
            model_provider: ModelProvider::from_str(&self.model_provider)?,
            article_id: self.article_id,
            http_timeout: self.http_timeout.0,
            model_timeout: self.model_timeout.0,
            retry: RetryPolicy::fixed(self.fetch_attempts.max(1), Duration::from_secs(1)),
            ..Config::default()
        };
        if let Some(models) = self.models {
            config.model_ids = models
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(url) = self.model_api_url {
            config.model_api_url = url;
        }
        if let Some(url) = self.search_api_url {
            config.search_api_url = url;
        }
        if let Some(url) = self.fallback_search_url {
            config.fallback_search_url = url;
        }
        config.with_search(self.search_api_key, self.search_engine_id)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn log_banner(config: &Config) {
    info!("📋 Configuration:");
    info!("   Articles API: {}", config.api_base());
    match config.model_api_key.as_deref() {
        Some(key) => info!("   Model: {:?} ({})", config.model_provider, mask_secret(key)),
        None => info!("   Model: {:?}", config.model_provider),
    }
    info!("   Model queue: {}", config.model_ids.join(", "));
    match &config.search {
        Some(_) => info!("   Search: Google Custom Search, then DuckDuckGo"),
        None => info!("   Search: DuckDuckGo only"),
    }
    info!("   Target: {}", ArticleTarget::from(config.article_id));
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.into_config().context("Invalid configuration")?;
    config.validate().context("Invalid configuration")?;
    log_banner(&config);

    let store = create_store(&config)?;
    let model = create_model(&config)?;
    let fetcher = Arc::new(HttpFetcher::new(config.http_timeout)?);
    let (primary, secondary) = create_search_providers(&config)?;
    let pipeline = Pipeline::from_config(&config, store, model, fetcher, primary, secondary);

    info!("🚀 Starting Content Upgrader...");
    let outcome = pipeline.run(ArticleTarget::from(config.article_id)).await?;
    info!(
        "✨ Enhanced \"{}\" with {} reference(s) using {}",
        outcome.article.title,
        outcome.references.len(),
        outcome.model_id
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("❌ Fatal error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
