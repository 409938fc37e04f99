use crate::config::ClassificationMode;
use url::Url;

/// Maps a product page URL onto its structured-data (JSON) endpoint.
#[derive(Debug, Clone)]
pub struct ProductEndpointResolver {
    extension: String,
    mode: ClassificationMode,
}

impl Default for ProductEndpointResolver {
    fn default() -> Self {
        Self::new(".json", ClassificationMode::Strict)
    }
}

impl ProductEndpointResolver {
    pub fn new(extension: impl Into<String>, mode: ClassificationMode) -> Self {
        Self {
            extension: extension.into(),
            mode,
        }
    }

    pub fn resolve(&self, product_url: &str) -> Option<String> {
        let mut url = parse_with_default_scheme(product_url)?;
        url.host_str()?;

        let path = match self.mode {
            ClassificationMode::Strict => self.strict_path(&url)?,
            ClassificationMode::Lenient => self.lenient_path(&url)?,
        };

        url.set_path(&path);
        url.set_query(None);
        url.set_fragment(None);
        Some(url.to_string())
    }

    /// `/products/<handle><ext>` where the handle is everything after the
    /// first `products` segment.
    fn strict_path(&self, url: &Url) -> Option<String> {
        let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
        let index = segments.iter().position(|s| *s == "products")?;
        let tail = &segments[index + 1..];
        if tail.is_empty() {
            return None;
        }
        Some(format!("/products/{}{}", tail.join("/"), self.extension))
    }

    fn lenient_path(&self, url: &Url) -> Option<String> {
        let path = url.path().trim_end_matches('/');
        if path.is_empty() {
            return None;
        }
        if path.ends_with(&self.extension) {
            Some(path.to_string())
        } else {
            Some(format!("{}{}", path, self.extension))
        }
    }
}

fn parse_with_default_scheme(raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.starts_with("//") {
        return Url::parse(&format!("https:{}", raw)).ok();
    }
    Url::parse(raw).ok()
}
