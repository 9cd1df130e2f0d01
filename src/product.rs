use crate::price::Price;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One extracted product page. Immutable after extraction; identified
/// downstream by its name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product title. An empty name means the page yielded nothing usable
    /// and the record is dropped before it reaches the catalog.
    pub name: String,

    /// Concatenated description text, possibly empty.
    pub description: String,

    /// Absolute image URLs, possibly empty.
    pub images: Vec<String>,

    /// Size label to purchasable flag, possibly empty.
    pub sizes: BTreeMap<String, bool>,

    /// Normalized price or the sold-out sentinel.
    pub price: Price,

    /// The product page this record was extracted from.
    pub url: String,
}

/// All products extracted for one shop in one run, keyed by product name.
///
/// Serializes to the persisted document shape: `{"products": {name: …}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub products: BTreeMap<String, Product>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a product keyed by its name. Returns the displaced product
    /// when the name was already present: the later page wins and the
    /// caller is expected to log the collision.
    pub fn insert(&mut self, product: Product) -> Option<Product> {
        self.products.insert(product.name.clone(), product)
    }

    pub fn get(&self, name: &str) -> Option<&Product> {
        self.products.get(name)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
