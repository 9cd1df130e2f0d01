// Re-export modules
pub mod config;
pub mod discover;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod price;
pub mod product;
pub mod runner;
pub mod session;
pub mod storage;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export commonly used types for convenience
pub use config::{RunConfig, SelectorConfig, ShopSpec};
pub use pipeline::ShopOutcome;
pub use price::{Price, PriceFormat};
pub use product::{Catalog, Product};
