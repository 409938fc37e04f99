use crate::config::ClassificationMode;
use crate::fetcher::Fetch;
use crate::observer::{NoopObserver, ScoutEvent, SharedObserver};
use crate::result::{SiteResult, SiteTarget};
use crate::sitemap::SitemapClassifier;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const NO_SEEDS_MESSAGE: &str = "No product sitemap URLs supplied for this site";

/// Breadth-first walk over one site's sitemap graph.
///
/// All traversal state lives inside a single [`TraversalEngine::traverse`]
/// call, so one engine can serve many sites concurrently.
pub struct TraversalEngine<F> {
    fetcher: F,
    classifier: SitemapClassifier,
    observer: SharedObserver,
}

/// Work list for one traversal. A URL is fetched at most once.
struct Frontier {
    queue: VecDeque<String>,
    queued: HashSet<String>,
    visited: HashSet<String>,
}

impl Frontier {
    fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            queued: HashSet::new(),
            visited: HashSet::new(),
        }
    }

    fn push(&mut self, url: &str) -> bool {
        if url.is_empty() || self.visited.contains(url) || self.queued.contains(url) {
            return false;
        }
        self.queued.insert(url.to_string());
        self.queue.push_back(url.to_string());
        true
    }

    fn pop(&mut self) -> Option<String> {
        while let Some(url) = self.queue.pop_front() {
            self.queued.remove(&url);
            if self.visited.insert(url.clone()) {
                return Some(url);
            }
        }
        None
    }

    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<F: Fetch> TraversalEngine<F> {
    pub fn new(fetcher: F, mode: ClassificationMode) -> Self {
        Self {
            fetcher,
            classifier: SitemapClassifier::new(mode),
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Discover product sitemaps and product URLs. Product records are not
    /// fetched here.
    pub async fn traverse(&self, site: &SiteTarget) -> SiteResult {
        info!("Processing {} ({})", site.brand, site.site_url);
        self.observer
            .note(&format!("Processing {} ({})", site.brand, site.site_url));

        let mut result = SiteResult::new(site);
        let mut frontier = Frontier::new();

        for seed in &site.sitemap_urls {
            let seed = seed.trim();
            if seed.is_empty() {
                continue;
            }
            result.add_product_sitemap(seed);
            frontier.push(seed);
        }

        if frontier.is_empty() {
            warn!("{} ({}): {}", site.brand, site.site_url, NO_SEEDS_MESSAGE);
            self.observer.note(NO_SEEDS_MESSAGE);
            result.add_error(NO_SEEDS_MESSAGE);
            return result;
        }

        while let Some(current) = frontier.pop() {
            let outcome = self.fetcher.fetch(&current).await;
            result.sitemap_history.push(current.clone());

            let Some(body) = outcome.body().filter(|_| outcome.is_ok()) else {
                let message = format!("Failed to fetch {}: {}", current, outcome.error_message());
                error!("{}", message);
                self.observer.note(&message);
                result.add_error(message);
                continue;
            };

            let classification = self.classifier.classify(&current, body);
            debug!(
                "Classified {} as {:?}: {} product sitemaps, {} nested, {} product URLs",
                current,
                classification.kind,
                classification.product_sitemaps.len(),
                classification.nested_sitemaps.len(),
                classification.product_urls.len()
            );
            self.observer.event(&ScoutEvent::SitemapClassified {
                url: current.clone(),
                kind: classification.kind,
                product_sitemaps: classification.product_sitemaps.len(),
                nested_sitemaps: classification.nested_sitemaps.len(),
                product_urls: classification.product_urls.len(),
            });

            for url in &classification.product_sitemaps {
                result.add_product_sitemap(url);
                if frontier.push(url) {
                    debug!("Queued product sitemap {}", url);
                }
            }

            if self.classifier.follows_nested() {
                for url in &classification.nested_sitemaps {
                    if frontier.push(url) {
                        debug!("Queued nested sitemap {}", url);
                    }
                }
            } else if !classification.nested_sitemaps.is_empty() {
                debug!(
                    "Skipping {} non-product sitemaps listed in {}",
                    classification.nested_sitemaps.len(),
                    current
                );
            }

            for url in &classification.product_urls {
                result.add_product_url(url);
            }
        }

        let message = format!(
            "Collected {} product URLs from {} sitemaps for {}",
            result.product_urls.len(),
            result.sitemap_history.len(),
            site.brand
        );
        info!("{}", message);
        self.observer.note(&message);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::ConversationLog;
    use crate::testing::{ScriptedFetcher, index, urlset};

    const ROOT: &str = "https://shop.example/sitemap.xml";
    const PRODUCTS_1: &str = "https://shop.example/sitemap_products_1.xml";
    const PRODUCTS_2: &str = "https://shop.example/sitemap_products_2.xml";
    const PAGES: &str = "https://shop.example/sitemap_pages_1.xml";

    fn site(seeds: &[&str]) -> SiteTarget {
        SiteTarget::new(
            "Acme",
            "https://shop.example",
            seeds.iter().map(|s| s.to_string()).collect(),
        )
    }

    fn shop_graph() -> ScriptedFetcher {
        ScriptedFetcher::new()
            .page(ROOT, &index(&[PRODUCTS_1, PAGES, PRODUCTS_2, PRODUCTS_1]))
            .page(
                PRODUCTS_1,
                &urlset(&[
                    "https://shop.example/products/widget",
                    "https://shop.example/products/gadget",
                ]),
            )
            .page(
                PRODUCTS_2,
                &urlset(&[
                    "https://shop.example/products/gadget",
                    "https://shop.example/products/gizmo",
                    "https://shop.example/pages/faq",
                ]),
            )
            .page(
                PAGES,
                &urlset(&["https://shop.example/pages/about", "https://shop.example/products/hidden"]),
            )
    }

    #[tokio::test]
    async fn test_breadth_first_discovery_in_order() {
        let engine = TraversalEngine::new(shop_graph(), ClassificationMode::Strict);
        let result = engine.traverse(&site(&[ROOT])).await;

        let sitemaps: Vec<&str> = result.product_sitemaps.iter().map(String::as_str).collect();
        assert_eq!(sitemaps, vec![ROOT, PRODUCTS_1, PRODUCTS_2]);

        let products: Vec<&str> = result.product_urls.iter().map(String::as_str).collect();
        assert_eq!(
            products,
            vec![
                "https://shop.example/products/widget",
                "https://shop.example/products/gadget",
                "https://shop.example/products/gizmo",
            ]
        );
        assert_eq!(result.sitemap_history, vec![ROOT, PRODUCTS_1, PRODUCTS_2]);
        assert!(result.errors.is_empty());
        assert!(result.products.is_empty());
    }

    #[tokio::test]
    async fn test_each_sitemap_fetched_once() {
        let engine = TraversalEngine::new(shop_graph(), ClassificationMode::Strict);
        engine.traverse(&site(&[ROOT, PRODUCTS_1, ROOT])).await;

        assert_eq!(engine.fetcher().calls(), vec![ROOT, PRODUCTS_1, PRODUCTS_2]);
    }

    #[tokio::test]
    async fn test_lenient_mode_follows_nested_sitemaps() {
        let engine = TraversalEngine::new(shop_graph(), ClassificationMode::Lenient);
        let result = engine.traverse(&site(&[ROOT])).await;

        assert_eq!(engine.fetcher().calls(), vec![ROOT, PRODUCTS_1, PRODUCTS_2, PAGES]);
        assert!(result.product_urls.contains("https://shop.example/products/hidden"));
        assert!(result.product_urls.contains("https://shop.example/pages/faq"));
        assert!(!result.product_sitemaps.contains(PAGES));
    }

    #[tokio::test]
    async fn test_traversal_is_idempotent() {
        let engine = TraversalEngine::new(shop_graph(), ClassificationMode::Strict);
        let first = engine.traverse(&site(&[ROOT])).await;
        let second = engine.traverse(&site(&[ROOT])).await;

        assert_eq!(first, second);
        assert!(first.product_urls.iter().eq(second.product_urls.iter()));
        assert!(first.product_sitemaps.iter().eq(second.product_sitemaps.iter()));
    }

    #[tokio::test]
    async fn test_cycles_terminate() {
        let a = "https://shop.example/sitemap_products_a.xml";
        let b = "https://shop.example/sitemap_products_b.xml";
        let fetcher = ScriptedFetcher::new()
            .page(a, &index(&[a, b]))
            .page(b, &index(&[a, b, a]));
        let engine = TraversalEngine::new(fetcher, ClassificationMode::Strict);
        let result = engine.traverse(&site(&[a])).await;

        assert_eq!(engine.fetcher().calls(), vec![a, b]);
        assert_eq!(result.product_sitemaps.len(), 2);
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_empty_seeds_record_single_error_without_fetching() {
        let engine = TraversalEngine::new(shop_graph(), ClassificationMode::Strict);
        let result = engine.traverse(&site(&["", "   "])).await;

        assert!(engine.fetcher().calls().is_empty());
        assert_eq!(result.errors, vec![NO_SEEDS_MESSAGE]);
        assert!(result.product_sitemaps.is_empty());
        assert!(result.product_urls.is_empty());

        let result = engine.traverse(&site(&[])).await;
        assert_eq!(result.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_sitemap_does_not_drop_other_results() {
        let fetcher = shop_graph().failing(PRODUCTS_1, "operation timed out");
        let engine = TraversalEngine::new(fetcher, ClassificationMode::Strict);
        let result = engine.traverse(&site(&[PRODUCTS_1, PRODUCTS_2])).await;

        assert_eq!(
            result.errors,
            vec![format!("Failed to fetch {}: operation timed out", PRODUCTS_1)]
        );
        assert!(result.product_urls.contains("https://shop.example/products/gizmo"));
        assert_eq!(result.product_urls.len(), 2);
        assert_eq!(result.sitemap_history, vec![PRODUCTS_1, PRODUCTS_2]);
    }

    #[tokio::test]
    async fn test_unparseable_sitemap_is_a_no_op() {
        let fetcher = ScriptedFetcher::new()
            .page(PRODUCTS_1, "<html><body>Not found</body></html>")
            .page(PRODUCTS_2, &urlset(&["https://shop.example/products/gizmo"]));
        let engine = TraversalEngine::new(fetcher, ClassificationMode::Strict);
        let result = engine.traverse(&site(&[PRODUCTS_1, PRODUCTS_2])).await;

        assert!(result.errors.is_empty());
        assert_eq!(result.product_urls.len(), 1);
    }

    #[tokio::test]
    async fn test_observer_sees_classifications() {
        let log = Arc::new(ConversationLog::new());
        let engine = TraversalEngine::new(shop_graph(), ClassificationMode::Strict)
            .with_observer(log.clone());
        let with_log = engine.traverse(&site(&[ROOT])).await;

        let classified = log
            .events()
            .into_iter()
            .filter(|e| matches!(e, ScoutEvent::SitemapClassified { .. }))
            .count();
        assert_eq!(classified, 3);
        assert!(log.notes()[0].starts_with("Processing Acme"));

        let silent = TraversalEngine::new(shop_graph(), ClassificationMode::Strict);
        assert_eq!(silent.traverse(&site(&[ROOT])).await, with_log);
    }
}
