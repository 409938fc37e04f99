use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use shelfscout_scanner::observer::noop;
use shelfscout_scanner::{
    Fetch, HttpFetcher, ProductCollector, ScoutConfig, SharedObserver, SiteResult, SiteTarget,
    TraversalEngine,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_WORKERS: usize = 4;

/// Options for configuring a scout run
pub struct ScoutOptions {
    pub sites: Vec<SiteTarget>,
    pub workers: usize,
    /// When false only sitemap discovery runs
    pub fetch_products: bool,
    pub show_progress_bars: bool,
}

impl ScoutOptions {
    pub fn new(sites: Vec<SiteTarget>) -> Self {
        Self {
            sites,
            workers: DEFAULT_WORKERS,
            fetch_products: true,
            show_progress_bars: false,
        }
    }
}

/// Callback invoked with each site's result as soon as that site finishes
pub type SiteCompleteCallback = Arc<dyn Fn(&SiteResult) + Send + Sync>;

/// Run traversal (and optionally product fetching) for every site.
///
/// Sites are processed by a bounded pool of `workers`; results come back in
/// input order regardless of completion order.
pub async fn execute_scout(
    options: ScoutOptions,
    config: &ScoutConfig,
    observer: Option<SharedObserver>,
    on_site_complete: Option<SiteCompleteCallback>,
) -> Result<Vec<SiteResult>, String> {
    let ScoutOptions {
        sites,
        workers,
        fetch_products,
        show_progress_bars,
    } = options;

    let observer = observer.unwrap_or_else(noop);
    let fetcher = HttpFetcher::new(config)
        .map_err(|e| format!("Failed to build HTTP client: {}", e))?
        .with_observer(observer.clone());

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new(sites.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .map_err(|e| format!("Invalid progress template: {}", e))?,
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting scout...");
        Some(pb)
    } else {
        None
    };

    let results = scout_sites(
        &fetcher,
        &sites,
        config,
        workers,
        fetch_products,
        &observer,
        progress_bar.as_ref(),
        on_site_complete.as_ref(),
    )
    .await;

    if let Some(ref pb) = progress_bar {
        pb.finish_with_message(format!("Scout complete! {} sites processed", results.len()));
    }

    Ok(results)
}

#[allow(clippy::too_many_arguments)]
async fn scout_sites<F: Fetch>(
    fetcher: &F,
    sites: &[SiteTarget],
    config: &ScoutConfig,
    workers: usize,
    fetch_products: bool,
    observer: &SharedObserver,
    progress_bar: Option<&ProgressBar>,
    on_site_complete: Option<&SiteCompleteCallback>,
) -> Vec<SiteResult> {
    let total = sites.len();

    stream::iter(sites.iter().enumerate())
        .map(|(index, site)| async move {
            info!("Processing site {}/{}: {}", index + 1, total, site.brand);
            let result = scout_site(fetcher, site, config, fetch_products, observer).await;

            if let Some(pb) = progress_bar {
                pb.inc(1);
                pb.set_message(format!("Finished {}", result.brand));
            }
            if let Some(callback) = on_site_complete {
                callback(&result);
            }
            result
        })
        .buffered(workers.max(1))
        .collect()
        .await
}

/// Traverse one site and, when asked, fetch its products
pub async fn scout_site<F: Fetch>(
    fetcher: &F,
    site: &SiteTarget,
    config: &ScoutConfig,
    fetch_products: bool,
    observer: &SharedObserver,
) -> SiteResult {
    let engine = TraversalEngine::new(fetcher, config.mode).with_observer(observer.clone());
    let mut result = engine.traverse(site).await;

    if fetch_products {
        ProductCollector::new(fetcher, config)
            .with_observer(observer.clone())
            .collect(&mut result)
            .await;
    }

    info!(
        "{}: {} sitemaps, {} product URLs, {} products, {} errors",
        result.brand,
        result.product_sitemaps.len(),
        result.product_urls.len(),
        result.successful_products(),
        result.count_errors()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfscout_scanner::{FetchOutcome, observer::ConversationLog};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct Pages {
        pages: HashMap<String, String>,
        calls: Mutex<Vec<String>>,
    }

    impl Pages {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, body)| (url.to_string(), body.to_string()))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl Fetch for Pages {
        async fn fetch(&self, url: &str) -> FetchOutcome {
            self.calls.lock().unwrap().push(url.to_string());
            match self.pages.get(url) {
                Some(body) => FetchOutcome::success(url, 200, body.clone()),
                None => FetchOutcome::failure(url, format!("HTTP 404 Not Found for {}", url)),
            }
        }
    }

    const PRODUCTS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://a.example/products/one</loc></url>
  <url><loc>https://a.example/products/two</loc></url>
</urlset>"#;

    fn pages() -> Pages {
        Pages::new(&[
            ("https://a.example/sitemap_products_1.xml", PRODUCTS_XML),
            ("https://a.example/products/one.json", r#"{"product": {"id": 1}}"#),
            ("https://a.example/products/two.json", r#"{"product": {"id": 2}}"#),
        ])
    }

    fn site(brand: &str, seeds: &[&str]) -> SiteTarget {
        SiteTarget::new(
            brand,
            "https://a.example",
            seeds.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[tokio::test]
    async fn test_results_follow_input_order() {
        let fetcher = pages();
        let sites = vec![
            site("First", &["https://a.example/sitemap_products_1.xml"]),
            site("Empty", &[]),
            site("Third", &["https://a.example/missing.xml"]),
        ];
        let observer = noop();

        let results = scout_sites(
            &fetcher,
            &sites,
            &ScoutConfig::default(),
            2,
            true,
            &observer,
            None,
            None,
        )
        .await;

        let brands: Vec<&str> = results.iter().map(|r| r.brand.as_str()).collect();
        assert_eq!(brands, vec!["First", "Empty", "Third"]);
        assert_eq!(results[0].successful_products(), 2);
        assert_eq!(results[1].errors.len(), 1);
        assert_eq!(results[2].errors.len(), 1);
    }

    #[tokio::test]
    async fn test_discovery_only_skips_product_fetches() {
        let fetcher = pages();
        let observer: SharedObserver = Arc::new(ConversationLog::new());
        let result = scout_site(
            &fetcher,
            &site("First", &["https://a.example/sitemap_products_1.xml"]),
            &ScoutConfig::default(),
            false,
            &observer,
        )
        .await;

        assert_eq!(result.product_urls.len(), 2);
        assert!(result.products.is_empty());
        assert_eq!(
            *fetcher.calls.lock().unwrap(),
            vec!["https://a.example/sitemap_products_1.xml"]
        );
    }

    #[tokio::test]
    async fn test_callback_fires_once_per_site() {
        let fetcher = pages();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let callback: SiteCompleteCallback = Arc::new(move |result: &SiteResult| {
            seen_clone.lock().unwrap().push(result.brand.clone());
        });
        let sites = vec![site("A", &[]), site("B", &[])];
        let observer = noop();

        scout_sites(
            &fetcher,
            &sites,
            &ScoutConfig::default(),
            0,
            true,
            &observer,
            None,
            Some(&callback),
        )
        .await;

        let mut seen = seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec!["A", "B"]);
    }
}
