use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to build HTTP client: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Malformed sitemap XML: {0}")]
    ParseError(#[from] quick_xml::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
