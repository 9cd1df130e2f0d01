use crate::config::ShopSpec;
use crate::pipeline::{self, ShopOutcome};
use crate::session::SessionProvider;
use crate::storage::Storage;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Runs every shop through the pipeline with a bounded worker pool.
///
/// Shops are independent units of work: one shop failing or stalling
/// occupies its own worker slot and nothing else. Completion order is
/// whatever the pool produces; no ordering guarantee across shops.
pub async fn run_all(
    shops: Vec<ShopSpec>,
    concurrency: usize,
    provider: Arc<dyn SessionProvider>,
    storage: Arc<dyn Storage>,
) -> Vec<ShopOutcome> {
    let total = shops.len();
    if total == 0 {
        return Vec::new();
    }
    let workers = concurrency.clamp(1, total);
    ::log::info!("processing {} shops with {} workers", total, workers);

    // Channels are sized for the whole run, so queueing never blocks.
    let (shop_tx, shop_rx) = mpsc::channel::<ShopSpec>(total);
    let (outcome_tx, mut outcome_rx) = mpsc::channel::<ShopOutcome>(total);
    let shop_rx = Arc::new(Mutex::new(shop_rx));

    for spec in shops {
        if let Err(e) = shop_tx.send(spec).await {
            ::log::error!("failed to queue shop {}: {}", e.0.company_name, e);
        }
    }
    // Workers drain the queue and exit when it closes.
    drop(shop_tx);

    for worker_id in 0..workers {
        spawn_worker(
            worker_id,
            Arc::clone(&shop_rx),
            outcome_tx.clone(),
            Arc::clone(&provider),
            Arc::clone(&storage),
        );
    }
    drop(outcome_tx);

    let mut outcomes = Vec::with_capacity(total);
    while let Some(outcome) = outcome_rx.recv().await {
        outcomes.push(outcome);
    }
    outcomes
}

fn spawn_worker(
    worker_id: usize,
    shop_rx: Arc<Mutex<mpsc::Receiver<ShopSpec>>>,
    outcome_tx: mpsc::Sender<ShopOutcome>,
    provider: Arc<dyn SessionProvider>,
    storage: Arc<dyn Storage>,
) {
    tokio::spawn(async move {
        loop {
            let spec = { shop_rx.lock().await.recv().await };
            let Some(spec) = spec else {
                break;
            };
            ::log::debug!("worker {} picked up shop {}", worker_id, spec.company_name);

            let outcome = process_shop(&spec, provider.as_ref(), storage.as_ref()).await;
            if outcome_tx.send(outcome).await.is_err() {
                break;
            }
        }
        ::log::debug!("worker {} finished, queue drained", worker_id);
    });
}

/// Opens a session for this shop only and closes it on every exit path
/// before the worker slot is reused.
async fn process_shop(
    spec: &ShopSpec,
    provider: &dyn SessionProvider,
    storage: &dyn Storage,
) -> ShopOutcome {
    let mut session = match provider.open().await {
        Ok(session) => session,
        Err(e) => {
            ::log::error!(
                "{}: could not open a browser session: {}",
                spec.company_name,
                e
            );
            return ShopOutcome::failed_outright(&spec.company_name, e);
        }
    };

    let outcome = pipeline::run_shop(spec, session.as_mut(), storage).await;
    session.close().await;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::testutil;
    use std::collections::HashMap;

    fn two_shop_pages() -> HashMap<String, String> {
        let mut pages = HashMap::new();
        // Shop A is fully healthy.
        pages.insert(
            "https://a.example/collections/all".to_string(),
            testutil::category_page(&["/products/shirt"]),
        );
        pages.insert(
            "https://a.example/products/shirt".to_string(),
            testutil::product_page("Shirt A", "€10,00"),
        );
        // Shop B has no category page at all: discovery fails.
        pages
    }

    #[tokio::test]
    async fn test_one_shop_failure_does_not_block_others() {
        let shops = vec![
            testutil::shop_spec("Shop A", "https://a.example"),
            testutil::shop_spec("Shop B", "https://b.example"),
        ];
        let provider = Arc::new(testutil::CannedProvider::new(two_shop_pages()));
        let storage = Arc::new(MemoryStore::new());

        let outcomes = run_all(shops, 2, provider, Arc::clone(&storage) as Arc<dyn Storage>).await;
        assert_eq!(outcomes.len(), 2);

        let a = outcomes
            .iter()
            .find(|o| o.company_name == "Shop A")
            .unwrap();
        let b = outcomes
            .iter()
            .find(|o| o.company_name == "Shop B")
            .unwrap();

        assert!(a.persisted);
        assert!(!b.persisted);
        assert_eq!(b.discovered, 0);

        assert!(storage.get("catalogs", "Shop A").is_some());
        assert!(storage.get("catalogs", "Shop B").is_none());
    }

    #[tokio::test]
    async fn test_single_worker_processes_every_shop() {
        let shops = vec![
            testutil::shop_spec("Shop A", "https://a.example"),
            testutil::shop_spec("Shop B", "https://b.example"),
            testutil::shop_spec("Shop C", "https://c.example"),
        ];
        let provider = Arc::new(testutil::CannedProvider::new(two_shop_pages()));
        let storage = Arc::new(MemoryStore::new());

        let outcomes = run_all(shops, 1, provider, storage).await;
        assert_eq!(outcomes.len(), 3);
    }

    #[tokio::test]
    async fn test_unreachable_session_becomes_failed_outcome() {
        let shops = vec![testutil::shop_spec("Shop A", "https://a.example")];
        let provider = Arc::new(testutil::UnreachableProvider);
        let storage = Arc::new(MemoryStore::new());

        let outcomes = run_all(shops, 3, provider, Arc::clone(&storage) as Arc<dyn Storage>).await;
        assert_eq!(outcomes.len(), 1);
        assert!(!outcomes[0].persisted);
        assert!(outcomes[0].error.is_some());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_no_shops_yields_no_outcomes() {
        let provider = Arc::new(testutil::CannedProvider::new(HashMap::new()));
        let storage = Arc::new(MemoryStore::new());
        let outcomes = run_all(Vec::new(), 3, provider, storage).await;
        assert!(outcomes.is_empty());
    }
}
