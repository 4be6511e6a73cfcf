//! Catalog filter state and request shaping.

/// Sentinel value meaning "no filter" for category/brand/source selections.
pub const ALL: &str = "all";

/// Source sent when the selection is empty or resolves to "all".
pub const DEFAULT_SOURCE: &str = "catalog";

/// Items fetched per page.
pub const DEFAULT_PAGE_SIZE: usize = 40;

/// Result ordering understood by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Backend default; omitted from the request.
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
}

impl SortOrder {
    /// Wire value for the `sort` query parameter, `None` for the default.
    pub fn as_param(&self) -> Option<&'static str> {
        match self {
            SortOrder::Relevance => None,
            SortOrder::PriceAsc => Some("price_asc"),
            SortOrder::PriceDesc => Some("price_desc"),
        }
    }
}

/// One fully-resolved product listing request.
///
/// Empty and `"all"` filter values are omitted from the request rather
/// than sent literally; `source`, `limit` and `offset` are always sent.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub query: String,
    pub sources: Vec<String>,
    pub category: String,
    pub brands: Vec<String>,
    pub color: Option<String>,
    pub sort: SortOrder,
    pub limit: usize,
    pub offset: usize,
}

impl ProductQuery {
    /// Text query, omitted when blank.
    pub fn query_param(&self) -> Option<&str> {
        let trimmed = self.query.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Comma-joined source ids; falls back to the default source when the
    /// selection is empty or contains the "all" sentinel.
    pub fn source_param(&self) -> String {
        resolve_source_param(&self.sources)
    }

    /// Category id, omitted for the "all" sentinel.
    pub fn category_param(&self) -> Option<&str> {
        (!self.category.is_empty() && self.category != ALL).then_some(self.category.as_str())
    }

    /// Comma-joined brand ids, omitted when empty or "all".
    pub fn brand_param(&self) -> Option<String> {
        if self.brands.is_empty() || self.brands.iter().any(|b| b == ALL) {
            return None;
        }
        Some(self.brands.join(","))
    }

    /// Color filter, omitted when unset or "all".
    pub fn color_param(&self) -> Option<&str> {
        self.color
            .as_deref()
            .filter(|c| !c.is_empty() && *c != ALL)
    }

    /// Sort key, omitted for the default ordering.
    pub fn sort_param(&self) -> Option<&'static str> {
        self.sort.as_param()
    }
}

/// Resolves a source selection to the wire value (always sent).
pub fn resolve_source_param(sources: &[String]) -> String {
    if sources.is_empty() || sources.iter().any(|s| s == ALL) {
        return DEFAULT_SOURCE.to_string();
    }
    sources.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_with(sources: &[&str], category: &str, brands: &[&str]) -> ProductQuery {
        ProductQuery {
            sources: sources.iter().map(|s| s.to_string()).collect(),
            category: category.to_string(),
            brands: brands.iter().map(|s| s.to_string()).collect(),
            ..ProductQuery::default()
        }
    }

    #[test]
    fn test_blank_query_is_omitted() {
        let mut q = ProductQuery::default();
        assert_eq!(q.query_param(), None);

        q.query = "   ".to_string();
        assert_eq!(q.query_param(), None);

        q.query = "oak table".to_string();
        assert_eq!(q.query_param(), Some("oak table"));
    }

    #[test]
    fn test_all_sentinel_is_omitted() {
        let mut q = query_with(&["catalog"], ALL, &[ALL]);
        q.color = Some(ALL.to_string());
        assert_eq!(q.category_param(), None);
        assert_eq!(q.brand_param(), None);
        assert_eq!(q.color_param(), None);

        q.color = Some("terracotta".to_string());
        assert_eq!(q.color_param(), Some("terracotta"));
    }

    #[test]
    fn test_source_always_resolves() {
        assert_eq!(query_with(&[], ALL, &[]).source_param(), "catalog");
        assert_eq!(query_with(&[ALL], ALL, &[]).source_param(), "catalog");
        assert_eq!(
            query_with(&["imported", "woocommerce"], ALL, &[]).source_param(),
            "imported,woocommerce"
        );
    }

    #[test]
    fn test_brand_param_joins_selection() {
        let q = query_with(&["catalog"], "chairs", &["vitra", "hay"]);
        assert_eq!(q.category_param(), Some("chairs"));
        assert_eq!(q.brand_param(), Some("vitra,hay".to_string()));
    }

    #[test]
    fn test_default_sort_is_omitted() {
        assert_eq!(SortOrder::Relevance.as_param(), None);
        assert_eq!(SortOrder::PriceAsc.as_param(), Some("price_asc"));
        assert_eq!(SortOrder::PriceDesc.as_param(), Some("price_desc"));
    }
}
