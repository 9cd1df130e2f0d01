use crate::config::CompiledSelectors;
use crate::error::FetchError;
use crate::price::{Price, PriceFormat};
use crate::product::Product;
use crate::session::Session;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;

/// Fetches one product page and extracts a `Product` from it.
///
/// Field extraction never fails: a selector that matches nothing resolves
/// to the documented empty/default value. Only the fetch itself can error,
/// and the caller excludes that product from the catalog.
pub async fn extract(
    session: &mut dyn Session,
    url: &str,
    selectors: &CompiledSelectors,
    price_format: PriceFormat,
) -> Result<Product, FetchError> {
    let html = session.fetch(url).await?;
    Ok(product_from_html(&html, url, selectors, price_format))
}

/// Pure extraction over an already-rendered document.
pub fn product_from_html(
    html: &str,
    url: &str,
    selectors: &CompiledSelectors,
    price_format: PriceFormat,
) -> Product {
    let doc = Html::parse_document(html);

    Product {
        name: extract_name(&doc, selectors),
        description: extract_description(&doc, selectors),
        images: extract_images(&doc, selectors),
        sizes: extract_sizes(&doc, selectors),
        price: extract_price(&doc, selectors, price_format),
        url: url.to_string(),
    }
}

/// First matching name node, trimmed. Missing node yields an empty name,
/// which drops the record upstream.
fn extract_name(doc: &Html, selectors: &CompiledSelectors) -> String {
    doc.select(&selectors.product_name)
        .next()
        .map(node_text)
        .unwrap_or_default()
}

/// Trimmed text of every description node joined with a single space, in
/// document order.
fn extract_description(doc: &Html, selectors: &CompiledSelectors) -> String {
    let Some(selector) = &selectors.product_description else {
        return String::new();
    };
    doc.select(selector)
        .map(node_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Every `img` under the single gallery node. Shopify CDNs emit
/// protocol-relative sources, which get an `https:` prefix.
fn extract_images(doc: &Html, selectors: &CompiledSelectors) -> Vec<String> {
    let Some(selector) = &selectors.image_gallery else {
        return Vec::new();
    };
    let Some(gallery) = doc.select(selector).next() else {
        return Vec::new();
    };

    let img = Selector::parse("img").unwrap();
    gallery
        .select(&img)
        .filter_map(|e| e.value().attr("src"))
        .map(absolute_image_url)
        .collect()
}

fn absolute_image_url(src: &str) -> String {
    if src.starts_with("//") {
        format!("https:{src}")
    } else {
        src.to_string()
    }
}

/// Size label (from the configured value attribute) to purchasable flag.
/// A node carrying the disabled marker class is not purchasable.
/// Duplicate labels: last one wins.
fn extract_sizes(doc: &Html, selectors: &CompiledSelectors) -> BTreeMap<String, bool> {
    let mut sizes = BTreeMap::new();
    let (Some(selector), Some(value_attribute), Some(disabled_marker)) = (
        &selectors.size_options,
        &selectors.size_value_attribute,
        &selectors.size_disabled_marker,
    ) else {
        return sizes;
    };

    for node in doc.select(selector) {
        let label = node
            .value()
            .attr(value_attribute)
            .unwrap_or_default()
            .trim()
            .to_string();
        let disabled = node.value().classes().any(|class| class == disabled_marker);
        sizes.insert(label, !disabled);
    }

    sizes
}

/// First matching price node, or `SoldOut` when absent. Shops render a
/// price range as "from — to"; only the upper bound after the last
/// em-dash is kept. Unparseable text also resolves to `SoldOut`.
fn extract_price(doc: &Html, selectors: &CompiledSelectors, format: PriceFormat) -> Price {
    let Some(node) = doc.select(&selectors.price).next() else {
        return Price::SoldOut;
    };

    let text = node_text(node);
    let raw = text.rsplit('—').next().unwrap_or_default().trim();
    match format.parse(raw) {
        Ok(amount) => Price::Minor(amount),
        Err(e) => {
            ::log::warn!("treating price as sold out: {}", e);
            Price::SoldOut
        }
    }
}

/// Whitespace-normalized text of a node and its descendants.
fn node_text(node: ElementRef) -> String {
    node.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
