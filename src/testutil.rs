//! Test doubles and page fixtures shared across module tests.

use crate::config::{SelectorConfig, ShopSpec};
use crate::error::FetchError;
use crate::price::PriceFormat;
use crate::session::{Session, SessionProvider};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Serves canned documents by URL, standing in for a browser session.
pub(crate) struct CannedSession {
    pages: Arc<HashMap<String, String>>,
}

#[async_trait]
impl Session for CannedSession {
    async fn fetch(&mut self, url: &str) -> Result<String, FetchError> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NoDocument(url.to_string()))
    }

    async fn close(self: Box<Self>) {}
}

pub(crate) fn canned_session(pages: HashMap<String, String>) -> Box<dyn Session> {
    Box::new(CannedSession {
        pages: Arc::new(pages),
    })
}

/// Opens `CannedSession`s over a shared page map.
pub(crate) struct CannedProvider {
    pages: Arc<HashMap<String, String>>,
}

impl CannedProvider {
    pub(crate) fn new(pages: HashMap<String, String>) -> Self {
        Self {
            pages: Arc::new(pages),
        }
    }
}

#[async_trait]
impl SessionProvider for CannedProvider {
    async fn open(&self) -> Result<Box<dyn Session>, FetchError> {
        Ok(Box::new(CannedSession {
            pages: Arc::clone(&self.pages),
        }))
    }
}

/// A provider whose sessions can never be opened.
pub(crate) struct UnreachableProvider;

#[async_trait]
impl SessionProvider for UnreachableProvider {
    async fn open(&self) -> Result<Box<dyn Session>, FetchError> {
        Err(FetchError::NoWebDriver("http://localhost:4444".to_string()))
    }
}

/// Selectors matching the fixture markup below.
pub(crate) fn demo_selectors() -> SelectorConfig {
    SelectorConfig {
        product_block: "li.grid-item".to_string(),
        product_link: "a.product-link".to_string(),
        product_name: "h1.product-title".to_string(),
        price: "span.price".to_string(),
        product_description: Some("div.description p".to_string()),
        image_gallery: Some("div.gallery".to_string()),
        size_options: Some("input.size".to_string()),
        size_value_attribute: Some("value".to_string()),
        size_disabled_marker: Some("disabled".to_string()),
    }
}

/// A shop spec over the fixture markup; the category listing lives at
/// `<base>/collections/all`.
pub(crate) fn shop_spec(company_name: &str, base_url: &str) -> ShopSpec {
    ShopSpec {
        company_name: company_name.to_string(),
        base_url: base_url.to_string(),
        category_url: format!("{base_url}/collections/all"),
        price_format: PriceFormat::Euro,
        selectors: demo_selectors(),
    }
}

/// A category page with one grid cell per href.
pub(crate) fn category_page(hrefs: &[&str]) -> String {
    let cells: String = hrefs
        .iter()
        .map(|href| {
            format!(r#"<li class="grid-item"><a class="product-link" href="{href}">view</a></li>"#)
        })
        .collect();
    format!("<html><body><ul>{cells}</ul></body></html>")
}

/// A product detail page with two description paragraphs, two gallery
/// images (one protocol-relative), an available size S and a disabled
/// size M.
pub(crate) fn product_page(name: &str, price: &str) -> String {
    format!(
        r#"<html><body>
        <h1 class="product-title">  {name}  </h1>
        <div class="description"><p>First paragraph.</p><p>Second paragraph.</p></div>
        <div class="gallery">
            <img src="//cdn.example.com/a.jpg">
            <img src="https://cdn.example.com/b.jpg">
        </div>
        <input class="size" type="radio" value="S">
        <input class="size disabled" type="radio" value="M">
        <span class="price">{price}</span>
    </body></html>"#
    )
}
