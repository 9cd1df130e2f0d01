use crate::config::CompiledSelectors;
use crate::session::Session;
use scraper::Html;
use std::collections::HashSet;
use url::Url;

/// Collects the deduplicated set of product URLs from a shop's category
/// page. First page only; pagination is out of scope.
///
/// Any fetch failure degrades to an empty set: the shop run continues
/// with zero products instead of aborting the multi-shop run.
pub async fn discover(
    session: &mut dyn Session,
    base_url: &Url,
    category_url: &str,
    selectors: &CompiledSelectors,
) -> HashSet<Url> {
    let html = match session.fetch(category_url).await {
        Ok(html) => html,
        Err(e) => {
            ::log::error!("failed to fetch category page {}: {}", category_url, e);
            return HashSet::new();
        }
    };

    let urls = product_urls(&html, base_url, selectors);
    ::log::info!("discovered {} product URLs on {}", urls.len(), category_url);
    urls
}

/// Pure parse step: the first link inside every product block, joined
/// against the base URL. A shop may list the same product in multiple
/// grid cells; the set collapses those duplicates.
pub fn product_urls(html: &str, base_url: &Url, selectors: &CompiledSelectors) -> HashSet<Url> {
    let doc = Html::parse_document(html);
    let mut urls = HashSet::new();

    for block in doc.select(&selectors.product_block) {
        let Some(link) = block.select(&selectors.product_link).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        match base_url.join(href) {
            Ok(url) => {
                urls.insert(url);
            }
            Err(e) => {
                ::log::warn!("skipping unjoinable href {:?}: {}", href, e);
            }
        }
    }

    urls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    fn base() -> Url {
        Url::parse("https://shop.example").unwrap()
    }

    fn compiled() -> CompiledSelectors {
        testutil::demo_selectors().compile("Shop").unwrap()
    }

    #[test]
    fn test_relative_links_join_base_url() {
        let html = testutil::category_page(&["/products/shirt", "/products/hat"]);
        let urls = product_urls(&html, &base(), &compiled());

        assert_eq!(urls.len(), 2);
        assert!(urls.contains(&Url::parse("https://shop.example/products/shirt").unwrap()));
        assert!(urls.contains(&Url::parse("https://shop.example/products/hat").unwrap()));
    }

    #[test]
    fn test_duplicate_grid_cells_collapse() {
        let html = testutil::category_page(&[
            "/products/shirt",
            "/products/shirt",
            "/products/hat",
            "/products/shirt",
        ]);
        let urls = product_urls(&html, &base(), &compiled());
        assert_eq!(urls.len(), 2);
    }

    #[test]
    fn test_block_without_link_skipped() {
        let html = r#"<html><body>
            <li class="grid-item"><span>no link here</span></li>
            <li class="grid-item"><a class="product-link" href="/products/only">p</a></li>
        </body></html>"#;
        let urls = product_urls(html, &base(), &compiled());
        assert_eq!(urls.len(), 1);
    }

    #[test]
    fn test_empty_page_yields_empty_set() {
        let urls = product_urls("<html><body></body></html>", &base(), &compiled());
        assert!(urls.is_empty());
    }
}
