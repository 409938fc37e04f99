use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A storefront to scout, as supplied by the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteTarget {
    pub brand: String,
    pub site_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_sitemap: Option<String>,
    pub sitemap_urls: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl SiteTarget {
    pub fn new(brand: impl Into<String>, site_url: impl Into<String>, sitemap_urls: Vec<String>) -> Self {
        Self {
            brand: brand.into(),
            site_url: site_url.into(),
            primary_sitemap: None,
            sitemap_urls,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_primary_sitemap(mut self, primary_sitemap: Option<String>) -> Self {
        self.primary_sitemap = primary_sitemap;
        self
    }

    pub fn with_metadata(mut self, metadata: BTreeMap<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_url: String,
    pub json_url: Option<String>,
    pub data: Option<Value>,
    pub error: Option<String>,
}

impl ProductRecord {
    pub fn success(product_url: String, json_url: String, data: Value) -> Self {
        Self {
            product_url,
            json_url: Some(json_url),
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(product_url: String, json_url: Option<String>, error: String) -> Self {
        Self {
            product_url,
            json_url,
            data: None,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.data.is_some() && self.error.is_none()
    }
}

/// Everything learned about one site. Lists only ever grow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteResult {
    pub brand: String,
    pub site_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_sitemap: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
    pub seed_sitemaps: Vec<String>,
    pub sitemap_history: Vec<String>,
    pub product_sitemaps: IndexSet<String>,
    pub product_urls: IndexSet<String>,
    pub products: Vec<ProductRecord>,
    pub errors: Vec<String>,
}

impl SiteResult {
    pub fn new(site: &SiteTarget) -> Self {
        Self {
            brand: site.brand.clone(),
            site_url: site.site_url.clone(),
            primary_sitemap: site.primary_sitemap.clone(),
            metadata: site.metadata.clone(),
            seed_sitemaps: site.sitemap_urls.clone(),
            sitemap_history: Vec::new(),
            product_sitemaps: IndexSet::new(),
            product_urls: IndexSet::new(),
            products: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    /// Returns true if the sitemap was not already recorded.
    pub fn add_product_sitemap(&mut self, url: &str) -> bool {
        !self.product_sitemaps.contains(url) && self.product_sitemaps.insert(url.to_string())
    }

    /// Returns true if the product URL was not already recorded.
    pub fn add_product_url(&mut self, url: &str) -> bool {
        !self.product_urls.contains(url) && self.product_urls.insert(url.to_string())
    }

    pub fn add_product(&mut self, record: ProductRecord) {
        if let Some(ref error) = record.error {
            self.errors.push(error.clone());
        }
        self.products.push(record);
    }

    pub fn successful_products(&self) -> usize {
        self.products.iter().filter(|p| p.is_ok()).count()
    }

    pub fn count_errors(&self) -> usize {
        self.errors.len()
    }

    /// Plain value tree for external serializers.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
