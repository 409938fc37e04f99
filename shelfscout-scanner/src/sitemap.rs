//! Sitemap document parsing and classification
//!
//! Two document shapes are recognised by their root element:
//! - `sitemapindex`: `sitemap/loc` entries point at further sitemaps
//! - `urlset`: `url/loc` entries are page locations
//!
//! Anything else (HTML, plain text, broken XML) classifies as empty.

use crate::config::ClassificationMode;
use crate::error::Result;
use indexmap::IndexSet;
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    Index(Vec<String>),
    UrlSet(Vec<String>),
    Unrecognized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    SitemapIndex,
    UrlSet,
    Unrecognized,
    Malformed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    NestedSitemap,
    ProductSitemap,
    ProductPage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub url: String,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub source_url: String,
    pub kind: DocumentKind,
    pub product_sitemaps: Vec<String>,
    pub nested_sitemaps: Vec<String>,
    pub product_urls: Vec<String>,
}

impl Classification {
    fn empty(source_url: &str, kind: DocumentKind) -> Self {
        Self {
            source_url: source_url.to_string(),
            kind,
            product_sitemaps: Vec::new(),
            nested_sitemaps: Vec::new(),
            product_urls: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.product_sitemaps.is_empty()
            && self.nested_sitemaps.is_empty()
            && self.product_urls.is_empty()
    }

    /// Every location found, tagged with its role.
    pub fn entries(&self) -> Vec<SitemapEntry> {
        let tag = |urls: &[String], kind: EntryKind| {
            urls.iter()
                .map(move |url| SitemapEntry {
                    url: url.clone(),
                    kind,
                })
                .collect::<Vec<_>>()
        };
        let mut entries = tag(&self.product_sitemaps, EntryKind::ProductSitemap);
        entries.extend(tag(&self.nested_sitemaps, EntryKind::NestedSitemap));
        entries.extend(tag(&self.product_urls, EntryKind::ProductPage));
        entries
    }
}

/// Case-insensitive `product` anywhere in the URL.
pub fn looks_like_product(url: &str) -> bool {
    url.to_ascii_lowercase().contains("product")
}

/// The URL path contains a `/products/` segment.
pub fn is_product_page(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().contains("/products/"),
        Err(_) => url.contains("/products/"),
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Root {
    Index,
    UrlSet,
    Other,
}

/// Pull `loc` values out of a sitemap index or urlset.
pub fn parse_document(body: &str) -> Result<SitemapDocument> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut root: Option<Root> = None;
    let mut stack: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut locations = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if root.is_none() {
                    let detected = root_kind(&name);
                    root = Some(detected);
                    if detected == Root::Other {
                        break;
                    }
                }
                if name == "loc" {
                    current.clear();
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                if root.is_none() {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                    root = Some(root_kind(&name));
                    break;
                }
            }
            Event::End(_) => {
                if let Some(name) = stack.pop()
                    && name == "loc"
                    && is_entry_parent(root, stack.last())
                {
                    let loc = current.trim();
                    if !loc.is_empty() {
                        locations.push(loc.to_string());
                    }
                    current.clear();
                }
            }
            Event::Text(e) => {
                if stack.last().is_some_and(|n| n == "loc") {
                    current.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if stack.last().is_some_and(|n| n == "loc") {
                    current.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(match root {
        Some(Root::Index) => SitemapDocument::Index(locations),
        Some(Root::UrlSet) => SitemapDocument::UrlSet(locations),
        _ => SitemapDocument::Unrecognized,
    })
}

fn root_kind(name: &str) -> Root {
    match name {
        "sitemapindex" => Root::Index,
        "urlset" => Root::UrlSet,
        _ => Root::Other,
    }
}

fn is_entry_parent(root: Option<Root>, parent: Option<&String>) -> bool {
    match (root, parent.map(String::as_str)) {
        (Some(Root::Index), Some("sitemap")) => true,
        (Some(Root::UrlSet), Some("url")) => true,
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SitemapClassifier {
    mode: ClassificationMode,
}

impl SitemapClassifier {
    pub fn new(mode: ClassificationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ClassificationMode {
        self.mode
    }

    /// Nested non-product sitemaps are only explored in lenient mode.
    pub fn follows_nested(&self) -> bool {
        self.mode == ClassificationMode::Lenient
    }

    pub fn classify(&self, source_url: &str, body: &str) -> Classification {
        let document = match parse_document(body) {
            Ok(document) => document,
            Err(e) => {
                debug!("Sitemap {} could not be parsed: {}", source_url, e);
                return Classification::empty(source_url, DocumentKind::Malformed);
            }
        };

        match document {
            SitemapDocument::Index(locations) => self.classify_index(source_url, locations),
            SitemapDocument::UrlSet(locations) => self.classify_urlset(source_url, locations),
            SitemapDocument::Unrecognized => {
                debug!(
                    "Sitemap {} does not contain <urlset> or <sitemapindex>",
                    source_url
                );
                Classification::empty(source_url, DocumentKind::Unrecognized)
            }
        }
    }

    fn classify_index(&self, source_url: &str, locations: Vec<String>) -> Classification {
        let mut product_sitemaps = IndexSet::new();
        let mut nested_sitemaps = IndexSet::new();
        for loc in locations {
            if looks_like_product(&loc) {
                product_sitemaps.insert(loc);
            } else {
                nested_sitemaps.insert(loc);
            }
        }

        Classification {
            source_url: source_url.to_string(),
            kind: DocumentKind::SitemapIndex,
            product_sitemaps: product_sitemaps.into_iter().collect(),
            nested_sitemaps: nested_sitemaps.into_iter().collect(),
            product_urls: Vec::new(),
        }
    }

    fn classify_urlset(&self, source_url: &str, locations: Vec<String>) -> Classification {
        let mut classification = Classification::empty(source_url, DocumentKind::UrlSet);
        let product_urls: IndexSet<String> = match self.mode {
            ClassificationMode::Strict => locations
                .into_iter()
                .filter(|loc| is_product_page(loc))
                .collect(),
            ClassificationMode::Lenient => locations.into_iter().collect(),
        };

        if self.mode == ClassificationMode::Strict
            && (!product_urls.is_empty() || looks_like_product(source_url))
        {
            classification.product_sitemaps.push(source_url.to_string());
        }
        classification.product_urls = product_urls.into_iter().collect();
        classification
    }
}
