pub mod config;
pub mod endpoint;
pub mod error;
pub mod fetcher;
pub mod observer;
pub mod product;
pub mod result;
pub mod sitemap;
pub mod traversal;

#[cfg(test)]
mod testing;

pub use config::{ClassificationMode, ScoutConfig};
pub use endpoint::ProductEndpointResolver;
pub use error::ScanError;
pub use fetcher::{Fetch, FetchOutcome, HttpFetcher};
pub use observer::{ConversationLog, NoopObserver, Observer, ScoutEvent, SharedObserver};
pub use product::ProductCollector;
pub use result::{ProductRecord, SiteResult, SiteTarget};
pub use sitemap::SitemapClassifier;
pub use traversal::TraversalEngine;
