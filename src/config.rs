use crate::error::ConfigError;
use crate::price::PriceFormat;
use crate::session::FetchLimits;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Where each product field lives in a shop's markup.
///
/// Required fields locate the product grid and the price; the optional
/// fields are simply not collected when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// One grid cell on the category page.
    pub product_block: String,

    /// The product link inside a grid cell.
    pub product_link: String,

    /// The product title on the detail page.
    pub product_name: String,

    /// The price node on the detail page.
    pub price: String,

    /// Description paragraphs, joined in document order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_description: Option<String>,

    /// The container holding the product's `img` elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_gallery: Option<String>,

    /// One node per size option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_options: Option<String>,

    /// Attribute on a size node carrying the size label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_value_attribute: Option<String>,

    /// Class marking a size option as not purchasable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_disabled_marker: Option<String>,
}

impl SelectorConfig {
    /// Compiles every selector string for use during extraction.
    ///
    /// Called once at config load to fail fast on a bad selector, and
    /// again at the start of a shop run to build the working set.
    pub fn compile(&self, shop: &str) -> Result<CompiledSelectors, ConfigError> {
        if self.size_options.is_some() {
            if self.size_value_attribute.is_none() {
                return Err(ConfigError::MissingCompanion {
                    shop: shop.to_string(),
                    field: "size_options",
                    companion: "size_value_attribute",
                });
            }
            if self.size_disabled_marker.is_none() {
                return Err(ConfigError::MissingCompanion {
                    shop: shop.to_string(),
                    field: "size_options",
                    companion: "size_disabled_marker",
                });
            }
        }

        Ok(CompiledSelectors {
            product_block: compile_one(shop, "product_block", &self.product_block)?,
            product_link: compile_one(shop, "product_link", &self.product_link)?,
            product_name: compile_one(shop, "product_name", &self.product_name)?,
            price: compile_one(shop, "price", &self.price)?,
            product_description: self
                .product_description
                .as_deref()
                .map(|s| compile_one(shop, "product_description", s))
                .transpose()?,
            image_gallery: self
                .image_gallery
                .as_deref()
                .map(|s| compile_one(shop, "image_gallery", s))
                .transpose()?,
            size_options: self
                .size_options
                .as_deref()
                .map(|s| compile_one(shop, "size_options", s))
                .transpose()?,
            size_value_attribute: self.size_value_attribute.clone(),
            size_disabled_marker: self.size_disabled_marker.clone(),
        })
    }
}

fn compile_one(shop: &str, field: &'static str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|_| ConfigError::Selector {
        shop: shop.to_string(),
        field,
        selector: selector.to_string(),
    })
}

/// The working set of compiled selectors for one shop run.
#[derive(Debug)]
pub struct CompiledSelectors {
    pub product_block: Selector,
    pub product_link: Selector,
    pub product_name: Selector,
    pub price: Selector,
    pub product_description: Option<Selector>,
    pub image_gallery: Option<Selector>,
    pub size_options: Option<Selector>,
    pub size_value_attribute: Option<String>,
    pub size_disabled_marker: Option<String>,
}

/// One catalog source: identity, entry URLs and field selectors.
/// Self-contained; shops inherit nothing from each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopSpec {
    pub company_name: String,

    /// Origin that relative product links are joined against.
    pub base_url: String,

    /// The category listing that product URLs are discovered from.
    pub category_url: String,

    /// Price normalization strategy for this shop.
    #[serde(default)]
    pub price_format: PriceFormat,

    pub selectors: SelectorConfig,
}

/// Configuration for a whole multi-shop run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub shops: Vec<ShopSpec>,

    /// Number of shops processed in parallel.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// URL for the WebDriver instance.
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Upper bound for one page fetch, navigation and render wait included.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Upper bound for the document-stability poll after navigation.
    #[serde(default = "default_render_timeout_secs")]
    pub render_timeout_secs: u64,

    /// Directory the file-backed document store writes to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl RunConfig {
    /// Loads and validates a run configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Parses and validates a run configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every shop before any network activity: entry URLs must
    /// parse and every selector must compile.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.shops.is_empty() {
            return Err(ConfigError::NoShops);
        }
        for shop in &self.shops {
            parse_url(&shop.company_name, &shop.base_url)?;
            parse_url(&shop.company_name, &shop.category_url)?;
            shop.selectors.compile(&shop.company_name)?;
        }
        Ok(())
    }

    pub fn fetch_limits(&self) -> FetchLimits {
        FetchLimits {
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            render_timeout: Duration::from_secs(self.render_timeout_secs),
        }
    }
}

fn parse_url(shop: &str, url: &str) -> Result<Url, ConfigError> {
    Url::parse(url).map_err(|source| ConfigError::Url {
        shop: shop.to_string(),
        url: url.to_string(),
        source,
    })
}

/// Default number of parallel shop workers
fn default_concurrency() -> usize {
    3
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    45
}

fn default_render_timeout_secs() -> u64 {
    10
}

fn default_output_dir() -> String {
    "catalogs".to_string()
}
