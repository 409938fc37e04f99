use anyhow::Context;
use clap::ArgMatches;
use colored::Colorize;
use shelfscout_core::persist::{JsonlLog, write_results};
use shelfscout_core::report::generate_scout_report;
use shelfscout_core::scout::{ScoutOptions, SiteCompleteCallback, execute_scout};
use shelfscout_core::sites::{expand_path, load_sites_from_file};
use shelfscout_scanner::{ClassificationMode, ScoutConfig, SiteResult, SiteTarget};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, error, info};

/// Route log output to stderr so stdout stays free for the report.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Build the fetch configuration from command line flags
pub fn build_config(args: &ArgMatches) -> ScoutConfig {
    let mut config = ScoutConfig::default();

    if let Some(retries) = args.get_one::<u32>("retries") {
        config = config.with_max_retries(*retries);
    }
    if let Some(timeout) = args.get_one::<u64>("timeout") {
        config = config.with_timeout(*timeout);
    }
    if let Some(backoff) = args.get_one::<f64>("retry-backoff") {
        config = config.with_retry_backoff(*backoff);
    }
    if let Some(delay) = args.get_one::<f64>("delay") {
        config = config.with_delay(*delay);
    }
    if let Some(user_agent) = args.get_one::<String>("user-agent") {
        config = config.with_user_agent(user_agent.clone());
    }
    if let Some(mode) = args
        .get_one::<String>("mode")
        .and_then(|mode| mode.parse::<ClassificationMode>().ok())
    {
        config = config.with_mode(mode);
    }

    // Only `scrape` defines these
    if let Ok(Some(extension)) = args.try_get_one::<String>("extension") {
        config = config.with_extension(extension.clone());
    }
    if let Ok(Some(max_products)) = args.try_get_one::<usize>("max-products") {
        config = config.with_max_products(Some(*max_products));
    }

    config
}

/// Resolve a path flag, expanding a leading `~`
pub fn path_arg(args: &ArgMatches, name: &str) -> Option<PathBuf> {
    args.try_get_one::<String>(name)
        .ok()
        .flatten()
        .map(|path| expand_path(path))
}

/// Load the sites file named by the SITES argument
pub fn load_sites(args: &ArgMatches) -> Result<Vec<SiteTarget>, String> {
    let path = path_arg(args, "SITES").ok_or_else(|| "A sites file must be provided".to_string())?;
    load_sites_from_file(&path)
}

/// Chain the optional JSONL logs into one per-site callback.
///
/// The progress log accumulates across runs; the product URL log is
/// rewritten each run.
pub fn persistence_callback(
    progress: Option<PathBuf>,
    product_urls: Option<PathBuf>,
) -> Result<Option<SiteCompleteCallback>, String> {
    let progress_log = progress.as_deref().map(JsonlLog::append).transpose()?;
    let product_url_log = product_urls.as_deref().map(JsonlLog::truncate).transpose()?;

    if progress_log.is_none() && product_url_log.is_none() {
        return Ok(None);
    }

    let callback: SiteCompleteCallback = Arc::new(move |result: &SiteResult| {
        if let Some(ref log) = progress_log
            && let Err(e) = log.write_site(result)
        {
            error!("{}", e);
        }
        if let Some(ref log) = product_url_log
            && let Err(e) = log.write_product_urls(result)
        {
            error!("{}", e);
        }
    });
    Ok(Some(callback))
}

pub async fn handle_scrape(sub_matches: &ArgMatches) {
    run_scout(sub_matches, true).await;
}

pub async fn handle_discover(sub_matches: &ArgMatches) {
    run_scout(sub_matches, false).await;
}

async fn run_scout(sub_matches: &ArgMatches, fetch_products: bool) {
    if let Err(e) = scout_and_write(sub_matches, fetch_products).await {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

/// Load, scout and write; per-site failures end up in the results, so only
/// input and output problems reach the caller.
pub async fn scout_and_write(sub_matches: &ArgMatches, fetch_products: bool) -> anyhow::Result<Vec<SiteResult>> {
    let sites = load_sites(sub_matches).map_err(anyhow::Error::msg)?;
    let config = build_config(sub_matches);
    let workers = *sub_matches.get_one::<usize>("workers").unwrap_or(&4);
    let show_progress_bars = !sub_matches.get_flag("no-progress-bar");
    let output = path_arg(sub_matches, "OUTPUT").context("An output path must be provided")?;

    let on_site_complete = persistence_callback(
        path_arg(sub_matches, "progress"),
        path_arg(sub_matches, "product-url-output"),
    )
    .map_err(anyhow::Error::msg)?;

    let verb = if fetch_products { "Scraping" } else { "Discovering" };
    println!(
        "\n{} {} site(s)",
        verb.bright_white().bold(),
        sites.len().to_string().bright_white()
    );
    println!("{} Workers: {}", "→".blue(), workers);
    println!("{} Mode: {}", "→".blue(), config.mode);
    println!(
        "{} Retries: {}, timeout: {}s, delay: {}s\n",
        "→".blue(),
        config.max_retries,
        config.request_timeout_secs,
        config.delay_between_requests
    );

    let options = ScoutOptions {
        sites,
        workers,
        fetch_products,
        show_progress_bars,
    };

    let results = execute_scout(options, &config, None, on_site_complete)
        .await
        .map_err(anyhow::Error::msg)
        .context("Scout failed")?;

    write_results(&output, &results).map_err(anyhow::Error::msg)?;

    let total_products: usize = results.iter().map(|r| r.products.len()).sum();
    info!(
        "Collected {} product payloads across {} store(s)",
        total_products,
        results.len()
    );

    println!("\n{} Scout complete!\n", "✓".green().bold());
    print!("{}", generate_scout_report(&results));
    println!(
        "{} Results written to {}",
        "✓".green().bold(),
        output.display().to_string().bright_white()
    );

    Ok(results)
}
