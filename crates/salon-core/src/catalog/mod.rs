//! Catalog browsing: filter state, offset pagination, facet cascade.

pub mod api;
pub mod engine;
pub mod query;

pub use api::CatalogApi;
pub use engine::{CatalogPager, CatalogView};
pub use query::{ProductQuery, SortOrder, ALL, DEFAULT_PAGE_SIZE, DEFAULT_SOURCE};
