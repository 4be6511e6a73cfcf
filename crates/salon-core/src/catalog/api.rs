//! Catalog read API trait definition.

use async_trait::async_trait;

use salon_types::{Facet, ProductPage};

use crate::catalog::query::ProductQuery;
use crate::error::Result;

/// Read side of the remote catalog service, as seen by the pagination
/// engine. The HTTP client implements this; tests inject doubles.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetches one page of products for the given filter state.
    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage>;

    /// Fetches the category facet for a source selection.
    ///
    /// # Arguments
    /// * `source` - Comma-joined source ids (already resolved, never "all")
    /// * `brand` - Optional brand scope
    async fn list_categories(&self, source: &str, brand: Option<&str>) -> Result<Vec<Facet>>;

    /// Fetches the brand facet for a source selection.
    async fn list_brands(&self, source: &str) -> Result<Vec<Facet>>;
}
