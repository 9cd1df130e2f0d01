use clap::Parser;
use shopcrawl::config::RunConfig;
use shopcrawl::runner;
use shopcrawl::session::WebDriverProvider;
use shopcrawl::storage::JsonDirStore;
use std::sync::Arc;

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let mut config = match RunConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("failed to load config {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // Environment override first, CLI flags win over both.
    if let Ok(url) = std::env::var("WEBDRIVER_URL") {
        if !url.is_empty() {
            config.webdriver_url = url;
        }
    }
    if let Some(url) = args.webdriver_url {
        config.webdriver_url = url;
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }

    println!("Note: shop runs require a WebDriver server (e.g., ChromeDriver).");
    println!(
        "Set WEBDRIVER_URL or --webdriver-url if not using {}",
        config.webdriver_url
    );

    let provider = Arc::new(WebDriverProvider::new(
        config.webdriver_url.clone(),
        config.fetch_limits(),
    ));
    let storage = Arc::new(JsonDirStore::new(config.output_dir.clone()));

    let start_time = std::time::Instant::now();
    let outcomes = runner::run_all(config.shops, config.concurrency, provider, storage).await;

    let mut persisted = 0;
    for outcome in &outcomes {
        if outcome.persisted {
            persisted += 1;
        }
        match &outcome.error {
            Some(error) => {
                ::log::error!("{}: run failed: {}", outcome.company_name, error);
            }
            None => {
                ::log::info!(
                    "{}: discovered {}, extracted {}, skipped {}, failed {}, persisted: {}",
                    outcome.company_name,
                    outcome.discovered,
                    outcome.extracted,
                    outcome.skipped,
                    outcome.failed,
                    outcome.persisted
                );
            }
        }
    }

    let duration = start_time.elapsed();
    ::log::info!(
        "run complete - persisted {} of {} catalogs in {:.2} seconds",
        persisted,
        outcomes.len(),
        duration.as_secs_f64()
    );
}
