use crate::config::ShopSpec;
use crate::discover;
use crate::extract;
use crate::product::Catalog;
use crate::session::Session;
use crate::storage::Storage;
use serde::Serialize;
use url::Url;

/// What happened to one shop in one run.
#[derive(Debug, Clone, Serialize)]
pub struct ShopOutcome {
    pub company_name: String,

    /// Product URLs found on the category page.
    pub discovered: usize,

    /// Product pages that yielded a named product.
    pub extracted: usize,

    /// Products dropped for an empty name.
    pub skipped: usize,

    /// Product pages that could not be fetched.
    pub failed: usize,

    /// Whether the catalog was written to storage.
    pub persisted: bool,

    /// Set when the run died before extraction could start, or when
    /// persistence failed.
    pub error: Option<String>,
}

impl ShopOutcome {
    pub(crate) fn failed_outright(company_name: &str, error: impl ToString) -> Self {
        Self {
            company_name: company_name.to_string(),
            discovered: 0,
            extracted: 0,
            skipped: 0,
            failed: 0,
            persisted: false,
            error: Some(error.to_string()),
        }
    }
}

/// Drives one shop through discovery, per-product extraction, catalog
/// aggregation and persistence.
///
/// Every failure is contained here and reported through the outcome: one
/// bad product page never aborts the shop, and one bad shop never aborts
/// the runner. The session is borrowed; the caller owns its lifecycle.
pub async fn run_shop(
    spec: &ShopSpec,
    session: &mut dyn Session,
    storage: &dyn Storage,
) -> ShopOutcome {
    let shop = spec.company_name.as_str();
    ::log::info!("starting shop run for {}", shop);

    // Strings were validated at config load; a failure here is still
    // contained as a per-shop outcome rather than a panic.
    let selectors = match spec.selectors.compile(shop) {
        Ok(selectors) => selectors,
        Err(e) => {
            ::log::error!("{}: {}", shop, e);
            return ShopOutcome::failed_outright(shop, e);
        }
    };
    let base_url = match Url::parse(&spec.base_url) {
        Ok(url) => url,
        Err(e) => {
            ::log::error!("{}: invalid base URL {:?}: {}", shop, spec.base_url, e);
            return ShopOutcome::failed_outright(shop, e);
        }
    };

    let urls = discover::discover(session, &base_url, &spec.category_url, &selectors).await;

    let mut catalog = Catalog::new();
    let mut extracted = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;

    // Strictly sequential: the session is not safe for concurrent use.
    for url in &urls {
        match extract::extract(session, url.as_str(), &selectors, spec.price_format).await {
            Ok(product) if product.name.is_empty() => {
                ::log::info!("{}: skipping unnamed product at {}", shop, url);
                skipped += 1;
            }
            Ok(product) => {
                ::log::debug!("{}: extracted {:?} from {}", shop, product.name, url);
                extracted += 1;
                if let Some(previous) = catalog.insert(product) {
                    ::log::warn!(
                        "{}: duplicate product name {:?}, keeping the later page (was {})",
                        shop,
                        previous.name,
                        previous.url
                    );
                }
            }
            Err(e) => {
                ::log::error!("{}: failed to extract {}: {}", shop, url, e);
                failed += 1;
            }
        }
    }

    let mut outcome = ShopOutcome {
        company_name: shop.to_string(),
        discovered: urls.len(),
        extracted,
        skipped,
        failed,
        persisted: false,
        error: None,
    };

    if catalog.is_empty() {
        ::log::warn!("{}: no products extracted, skipping persistence", shop);
        return outcome;
    }

    let document = match serde_json::to_value(&catalog) {
        Ok(document) => document,
        Err(e) => {
            ::log::error!("{}: failed to serialize catalog: {}", shop, e);
            outcome.error = Some(e.to_string());
            return outcome;
        }
    };

    match storage.upsert("catalogs", shop, document).await {
        Ok(()) => {
            ::log::info!("{}: persisted {} products", shop, catalog.len());
            outcome.persisted = true;
        }
        Err(e) => {
            ::log::error!("{}: failed to persist catalog: {}", shop, e);
            outcome.error = Some(e.to_string());
        }
    }

    outcome
}
