use crate::config::ScoutConfig;
use crate::endpoint::ProductEndpointResolver;
use crate::fetcher::Fetch;
use crate::observer::{NoopObserver, ScoutEvent, SharedObserver};
use crate::result::{ProductRecord, SiteResult};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Fetches the structured-data payload for every discovered product URL.
pub struct ProductCollector<F> {
    fetcher: F,
    resolver: ProductEndpointResolver,
    max_products: Option<usize>,
    observer: SharedObserver,
}

impl<F: Fetch> ProductCollector<F> {
    pub fn new(fetcher: F, config: &ScoutConfig) -> Self {
        Self {
            fetcher,
            resolver: ProductEndpointResolver::new(config.product_json_extension.clone(), config.mode),
            max_products: config.max_products,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn resolver(&self) -> &ProductEndpointResolver {
        &self.resolver
    }

    /// Append one record per product URL, in discovery order, until the
    /// optional cap is reached.
    pub async fn collect(&self, result: &mut SiteResult) {
        let product_urls: Vec<String> = result.product_urls.iter().cloned().collect();
        let total = product_urls.len();
        if total > 0 {
            info!("Fetching product details for {} items from {}", total, result.brand);
        }

        for (index, product_url) in product_urls.iter().enumerate() {
            if let Some(max) = self.max_products
                && result.products.len() >= max
            {
                info!("Reached max_products={} for {}, stopping early", max, result.brand);
                self.observer
                    .note(&format!("Reached max_products={} for {}", max, result.brand));
                break;
            }

            let position = index + 1;
            debug!("[{}] Fetching product {}/{}: {}", result.brand, position, total, product_url);
            if position == 1 || position == total || position % 50 == 0 {
                info!("[{}] Progress: {}/{} products", result.brand, position, total);
            }

            let record = self.fetch_product(product_url).await;
            self.observer.event(&ScoutEvent::ProductRecorded {
                product_url: product_url.clone(),
                ok: record.is_ok(),
            });
            result.add_product(record);
        }
    }

    pub async fn fetch_product(&self, product_url: &str) -> ProductRecord {
        let Some(json_url) = self.resolver.resolve(product_url) else {
            let message = format!("Unable to derive JSON endpoint for {}", product_url);
            warn!("{}", message);
            return ProductRecord::failure(product_url.to_string(), None, message);
        };

        let outcome = self.fetcher.fetch(&json_url).await;
        let ok = outcome.is_ok();
        let response = match outcome.response {
            Some(response) if ok => response,
            _ => {
                let reason = outcome.error.as_deref().unwrap_or("unknown error");
                let message = format!("Failed to fetch product {}: {}", json_url, reason);
                error!("{}", message);
                return ProductRecord::failure(product_url.to_string(), Some(json_url), message);
            }
        };

        match response.into_json() {
            Ok(data) => ProductRecord::success(product_url.to_string(), json_url, data),
            Err(e) => {
                let message = format!("Invalid JSON from {}: {}", json_url, e);
                error!("{}", message);
                ProductRecord::failure(product_url.to_string(), Some(json_url), message)
            }
        }
    }
}
