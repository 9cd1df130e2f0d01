use thiserror::Error;

/// Failure to fetch a rendered document through a browser session.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A WebDriver protocol command failed (navigation, source retrieval).
    #[error("WebDriver command failed: {0}")]
    Command(#[from] fantoccini::error::CmdError),

    /// No WebDriver server could be reached at the configured URL or any
    /// of the fallback addresses.
    #[error("no WebDriver server reachable (tried {0} and fallbacks)")]
    NoWebDriver(String),

    /// The whole fetch (navigation plus render wait) exceeded its deadline.
    #[error("fetch of {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    /// The session has no document for this URL.
    #[error("no document available for {0}")]
    NoDocument(String),
}

/// Price text that could not be turned into a minor-unit amount.
///
/// Always resolved by the extractor into `Price::SoldOut`, never a hard
/// error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse price text {text:?}")]
pub struct PriceParseError {
    pub text: String,
}

/// Document store write failure.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write document: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Invalid run configuration. The only fatal error class: it aborts
/// startup before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no shops configured")]
    NoShops,

    #[error("shop {shop}: invalid {field} selector {selector:?}")]
    Selector {
        shop: String,
        field: &'static str,
        selector: String,
    },

    #[error("shop {shop}: {field} requires {companion} to be set")]
    MissingCompanion {
        shop: String,
        field: &'static str,
        companion: &'static str,
    },

    #[error("shop {shop}: invalid URL {url:?}: {source}")]
    Url {
        shop: String,
        url: String,
        source: url::ParseError,
    },
}
