//! Project (board) model.

use serde::{Deserialize, Serialize};

use crate::product::Product;

/// A named, user-owned collection of saved products.
///
/// Items are ordered most-recently-added first. No two items share a
/// `slug`; the invariant is enforced at add time, not at load time, so a
/// corrupted persisted collection could violate it silently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Client-generated, time-based identifier.
    pub id: String,
    pub name: String,
    pub items: Vec<Product>,
}

impl Project {
    /// Returns true if an item with the given slug is already saved.
    pub fn contains(&self, slug: &str) -> bool {
        self.items.iter().any(|item| item.slug == slug)
    }

    /// Prepends the product unless an item with the same slug exists.
    ///
    /// Returns true if the project changed.
    pub fn prepend_unique(&mut self, product: Product) -> bool {
        if self.contains(&product.slug) {
            return false;
        }
        self.items.insert(0, product);
        true
    }

    /// Removes every item with the given slug.
    pub fn remove_item(&mut self, slug: &str) {
        self.items.retain(|item| item.slug != slug);
    }
}
