//! Catalog pagination engine.
//!
//! [`CatalogPager`] owns the filter state of a product listing and drives
//! offset-based pagination against a [`CatalogApi`]. Any filter change
//! atomically clears the accumulated list and restarts from page one; a
//! generation counter makes sure a response that was in flight when the
//! filters changed can never append to the new list.

use std::sync::Arc;

use tokio::sync::RwLock;

use salon_types::{Facet, Product};

use crate::catalog::api::CatalogApi;
use crate::catalog::query::{
    resolve_source_param, ProductQuery, SortOrder, ALL, DEFAULT_PAGE_SIZE,
};
use crate::error::Result;

/// A renderable snapshot of the listing state.
#[derive(Debug, Clone)]
pub struct CatalogView {
    pub items: Vec<Product>,
    /// Total matching items as reported by the last successful fetch.
    pub total: u64,
    pub page: usize,
    pub has_more: bool,
    pub loading: bool,
    pub categories: Vec<Facet>,
    pub brands: Vec<Facet>,
}

struct PagerState {
    // Filter state
    query: String,
    sources: Vec<String>,
    category: String,
    brands: Vec<String>,
    sort: SortOrder,
    // Result state
    items: Vec<Product>,
    total: u64,
    page: usize,
    has_more: bool,
    loading: bool,
    /// Bumped on every filter reset; fetches tagged with an older value
    /// are discarded on arrival.
    generation: u64,
    // Facets
    categories: Vec<Facet>,
    brand_facets: Vec<Facet>,
}

impl PagerState {
    fn new() -> Self {
        Self {
            query: String::new(),
            sources: Vec::new(),
            category: ALL.to_string(),
            brands: vec![ALL.to_string()],
            sort: SortOrder::default(),
            items: Vec::new(),
            total: 0,
            page: 1,
            has_more: true,
            loading: false,
            generation: 0,
            categories: vec![Facet::new(ALL, "All categories")],
            brand_facets: vec![Facet::new(ALL, "All brands")],
        }
    }

    /// The atomic filter-change transition: clear the list and restart
    /// pagination before the next fetch is allowed to fire.
    fn reset(&mut self) {
        self.items.clear();
        self.page = 1;
        self.has_more = true;
        self.generation += 1;
    }

    fn build_query(&self, limit: usize) -> ProductQuery {
        ProductQuery {
            query: self.query.clone(),
            sources: self.sources.clone(),
            category: self.category.clone(),
            brands: self.brands.clone(),
            color: None,
            sort: self.sort,
            limit,
            offset: (self.page - 1) * limit,
        }
    }
}

/// State machine over filter state x accumulated listing pages.
pub struct CatalogPager {
    api: Arc<dyn CatalogApi>,
    limit: usize,
    state: RwLock<PagerState>,
}

impl CatalogPager {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self::with_limit(api, DEFAULT_PAGE_SIZE)
    }

    pub fn with_limit(api: Arc<dyn CatalogApi>, limit: usize) -> Self {
        Self {
            api,
            limit,
            state: RwLock::new(PagerState::new()),
        }
    }

    // ============================================================================
    // Filter setters - each change resets pagination
    // ============================================================================

    pub async fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        let mut state = self.state.write().await;
        if state.query != query {
            state.query = query;
            state.reset();
        }
    }

    pub async fn set_sources(&self, sources: Vec<String>) {
        let mut state = self.state.write().await;
        if state.sources != sources {
            state.sources = sources;
            state.reset();
        }
    }

    pub async fn set_category(&self, category: impl Into<String>) {
        let category = category.into();
        let mut state = self.state.write().await;
        if state.category != category {
            state.category = category;
            state.reset();
        }
    }

    pub async fn set_brands(&self, brands: Vec<String>) {
        let mut state = self.state.write().await;
        if state.brands != brands {
            state.brands = brands;
            state.reset();
        }
    }

    pub async fn set_sort(&self, sort: SortOrder) {
        let mut state = self.state.write().await;
        if state.sort != sort {
            state.sort = sort;
            state.reset();
        }
    }

    // ============================================================================
    // Fetch transitions
    // ============================================================================

    /// Fetches the current page and applies it to the listing.
    ///
    /// Replaces the list on page one, appends on later pages. A short page
    /// or a fetch failure stops pagination (`has_more = false`); failures
    /// never clear already-accumulated items. A response arriving after a
    /// filter reset is dropped.
    pub async fn load_page(&self) -> Result<()> {
        let (query, generation) = {
            let mut state = self.state.write().await;
            if !state.has_more {
                return Ok(());
            }
            state.loading = true;
            (state.build_query(self.limit), state.generation)
        };

        let result = self.api.list_products(&query).await;

        let mut state = self.state.write().await;
        if state.generation != generation {
            // A newer filter state owns the listing now; this response is stale.
            tracing::debug!(generation, "discarding product page from superseded fetch");
            return Ok(());
        }
        state.loading = false;

        match result {
            Ok(page) => {
                state.total = page.total;
                if page.items.len() < self.limit {
                    state.has_more = false;
                }
                if state.page == 1 {
                    state.items = page.items;
                } else {
                    state.items.extend(page.items);
                }
            }
            Err(err) => {
                // Fail closed: stop paginating instead of retrying forever.
                state.has_more = false;
                tracing::warn!(error = %err, "product fetch failed, pagination stopped");
            }
        }
        Ok(())
    }

    /// Continuation trigger: advances one page and fetches it.
    ///
    /// Gated on `has_more && !loading`, matching the visibility-sentinel
    /// contract; a manual "load more" control calls the same transition.
    pub async fn advance(&self) -> Result<()> {
        {
            let mut state = self.state.write().await;
            if !state.has_more || state.loading {
                return Ok(());
            }
            state.page += 1;
        }
        self.load_page().await
    }

    // ============================================================================
    // Facet cascade
    // ============================================================================

    /// Refetches category and brand facets for the current source selection.
    ///
    /// On success the matching selection is reset to the "all" sentinel,
    /// since the previous selection may no longer exist in the new facet
    /// set. A failed facet fetch keeps the prior facets in place; facet
    /// loading never blocks product loading.
    pub async fn reload_facets(&self) {
        let source = {
            let state = self.state.read().await;
            resolve_source_param(&state.sources)
        };

        let (categories, brands) = tokio::join!(
            self.api.list_categories(&source, None),
            self.api.list_brands(&source),
        );

        match categories {
            Ok(list) => {
                let mut state = self.state.write().await;
                state.categories = list;
                if state.category != ALL {
                    state.category = ALL.to_string();
                    state.reset();
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, source = %source, "failed to load categories");
            }
        }

        match brands {
            Ok(list) => {
                let mut state = self.state.write().await;
                let mut facets = vec![Facet::new(ALL, "All brands")];
                facets.extend(list);
                state.brand_facets = facets;
                if state.brands != [ALL.to_string()] {
                    state.brands = vec![ALL.to_string()];
                    state.reset();
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, source = %source, "failed to load brands");
            }
        }
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    /// Clones the current listing state for rendering.
    pub async fn snapshot(&self) -> CatalogView {
        let state = self.state.read().await;
        CatalogView {
            items: state.items.clone(),
            total: state.total,
            page: state.page,
            has_more: state.has_more,
            loading: state.loading,
            categories: state.categories.clone(),
            brands: state.brand_facets.clone(),
        }
    }

    pub async fn selected_category(&self) -> String {
        self.state.read().await.category.clone()
    }

    pub async fn selected_brands(&self) -> Vec<String> {
        self.state.read().await.brands.clone()
    }

    pub async fn selected_sources(&self) -> Vec<String> {
        self.state.read().await.sources.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    use crate::error::SalonError;
    use salon_types::ProductPage;

    fn make_products(prefix: &str, count: usize) -> Vec<Product> {
        (0..count)
            .map(|i| Product::new(format!("{prefix}-{i}"), format!("Item {i}")))
            .collect()
    }

    /// Serves slices of a fixed dataset by offset/limit.
    struct SliceApi {
        items: Vec<Product>,
        calls: AtomicUsize,
        fail_after: Option<usize>,
    }

    impl SliceApi {
        fn new(items: Vec<Product>) -> Self {
            Self {
                items,
                calls: AtomicUsize::new(0),
                fail_after: None,
            }
        }

        fn failing_after(items: Vec<Product>, calls: usize) -> Self {
            Self {
                items,
                calls: AtomicUsize::new(0),
                fail_after: Some(calls),
            }
        }
    }

    #[async_trait]
    impl CatalogApi for SliceApi {
        async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(limit) = self.fail_after {
                if call >= limit {
                    return Err(SalonError::api(Some(500), "backend unavailable"));
                }
            }
            let start = query.offset.min(self.items.len());
            let end = (query.offset + query.limit).min(self.items.len());
            Ok(ProductPage {
                items: self.items[start..end].to_vec(),
                total: self.items.len() as u64,
            })
        }

        async fn list_categories(&self, _source: &str, _brand: Option<&str>) -> Result<Vec<Facet>> {
            Ok(vec![Facet::new(ALL, "All categories"), Facet::new("chairs", "Chairs")])
        }

        async fn list_brands(&self, _source: &str) -> Result<Vec<Facet>> {
            Ok(vec![Facet::new("vitra", "Vitra")])
        }
    }

    #[tokio::test]
    async fn test_pagination_is_deterministic() {
        // 95 items at 40 per page: exactly three fetches, then no more.
        let api = Arc::new(SliceApi::new(make_products("p", 95)));
        let pager = CatalogPager::new(api.clone());

        pager.load_page().await.unwrap();
        while pager.snapshot().await.has_more {
            pager.advance().await.unwrap();
        }

        let view = pager.snapshot().await;
        assert_eq!(api.calls.load(Ordering::SeqCst), 3);
        assert_eq!(view.items.len(), 95);
        assert_eq!(view.total, 95);
        assert!(!view.has_more);

        // Further advances are no-ops once exhausted.
        pager.advance().await.unwrap();
        assert_eq!(api.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exact_multiple_stops_on_empty_page() {
        let api = Arc::new(SliceApi::new(make_products("p", 80)));
        let pager = CatalogPager::new(api.clone());

        pager.load_page().await.unwrap();
        while pager.snapshot().await.has_more {
            pager.advance().await.unwrap();
        }

        // 80 = 2 full pages plus one empty page that flips has_more.
        assert_eq!(api.calls.load(Ordering::SeqCst), 3);
        assert_eq!(pager.snapshot().await.items.len(), 80);
    }

    #[tokio::test]
    async fn test_filter_change_resets_before_fetch() {
        let api = Arc::new(SliceApi::new(make_products("p", 60)));
        let pager = CatalogPager::new(api);

        pager.load_page().await.unwrap();
        assert_eq!(pager.snapshot().await.items.len(), 40);

        pager.set_query("walnut").await;

        let view = pager.snapshot().await;
        assert!(view.items.is_empty());
        assert_eq!(view.page, 1);
        assert!(view.has_more);
    }

    #[tokio::test]
    async fn test_unchanged_filter_does_not_reset() {
        let api = Arc::new(SliceApi::new(make_products("p", 60)));
        let pager = CatalogPager::new(api);

        pager.set_query("walnut").await;
        pager.load_page().await.unwrap();
        assert_eq!(pager.snapshot().await.items.len(), 40);

        // Same value again: accumulated items must survive.
        pager.set_query("walnut").await;
        assert_eq!(pager.snapshot().await.items.len(), 40);
    }

    #[tokio::test]
    async fn test_fetch_failure_stops_pagination_keeps_items() {
        let api = Arc::new(SliceApi::failing_after(make_products("p", 120), 1));
        let pager = CatalogPager::new(api);

        pager.load_page().await.unwrap();
        assert_eq!(pager.snapshot().await.items.len(), 40);

        pager.advance().await.unwrap();

        let view = pager.snapshot().await;
        assert!(!view.has_more);
        assert!(!view.loading);
        assert_eq!(view.items.len(), 40);
    }

    /// Blocks the first matching query until released, so a test can
    /// interleave a slow fetch with a newer one.
    struct GatedApi {
        slow: Vec<Product>,
        fast: Vec<Product>,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl CatalogApi for GatedApi {
        async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage> {
            if query.query == "slow" {
                self.entered.notify_one();
                self.release.notified().await;
                Ok(ProductPage {
                    items: self.slow.clone(),
                    total: self.slow.len() as u64,
                })
            } else {
                Ok(ProductPage {
                    items: self.fast.clone(),
                    total: self.fast.len() as u64,
                })
            }
        }

        async fn list_categories(&self, _source: &str, _brand: Option<&str>) -> Result<Vec<Facet>> {
            Ok(Vec::new())
        }

        async fn list_brands(&self, _source: &str) -> Result<Vec<Facet>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_stale_fetch_is_discarded() {
        let api = Arc::new(GatedApi {
            slow: make_products("slow", 5),
            fast: make_products("fast", 3),
            entered: Notify::new(),
            release: Notify::new(),
        });
        let pager = Arc::new(CatalogPager::new(api.clone() as Arc<dyn CatalogApi>));

        pager.set_query("slow").await;
        let slow_pager = pager.clone();
        let slow_fetch = tokio::spawn(async move { slow_pager.load_page().await });

        // Wait until the slow fetch is in flight, then supersede it.
        api.entered.notified().await;
        pager.set_query("fast").await;
        pager.load_page().await.unwrap();

        // Let the slow response arrive late.
        api.release.notify_one();
        slow_fetch.await.unwrap().unwrap();

        let view = pager.snapshot().await;
        assert_eq!(view.items.len(), 3);
        assert!(view.items.iter().all(|p| p.slug.starts_with("fast")));
    }

    #[tokio::test]
    async fn test_facet_reload_resets_selection() {
        let api = Arc::new(SliceApi::new(make_products("p", 10)));
        let pager = CatalogPager::new(api);

        pager.set_category("chairs").await;
        pager.set_brands(vec!["vitra".to_string()]).await;

        pager.reload_facets().await;

        assert_eq!(pager.selected_category().await, ALL);
        assert_eq!(pager.selected_brands().await, vec![ALL.to_string()]);

        let view = pager.snapshot().await;
        assert_eq!(view.categories.len(), 2);
        // Brand facet list always carries the "all" entry first.
        assert_eq!(view.brands[0].id, ALL);
        assert_eq!(view.brands.len(), 2);
    }

    struct FailingFacetApi;

    #[async_trait]
    impl CatalogApi for FailingFacetApi {
        async fn list_products(&self, _query: &ProductQuery) -> Result<ProductPage> {
            Ok(ProductPage::default())
        }

        async fn list_categories(&self, _source: &str, _brand: Option<&str>) -> Result<Vec<Facet>> {
            Err(SalonError::api(Some(502), "bad gateway"))
        }

        async fn list_brands(&self, _source: &str) -> Result<Vec<Facet>> {
            Err(SalonError::api(Some(502), "bad gateway"))
        }
    }

    #[tokio::test]
    async fn test_facet_failure_keeps_prior_facets() {
        let pager = CatalogPager::new(Arc::new(FailingFacetApi));

        pager.reload_facets().await;

        let view = pager.snapshot().await;
        assert_eq!(view.categories, vec![Facet::new(ALL, "All categories")]);
        assert_eq!(view.brands, vec![Facet::new(ALL, "All brands")]);
    }
}
