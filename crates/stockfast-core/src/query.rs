//! # Product Queries
//!
//! An immutable description of "which products, in what order, which page".
//! Built once from request parameters, then handed to the persistence
//! gateway which interprets each filter variant.
//!
//! ## Filter Placement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ListParams / SearchParams (query string, all text)                    │
//! │       │                                                                 │
//! │       ▼  ProductQuery::from_list_params / from_search_params           │
//! │  ProductQuery { mode, filters[], sort, page }                          │
//! │       │                                                                 │
//! │       ├── store_filters() ──► SQL WHERE (stockfast-db)                 │
//! │       │     Search, ExactMatch, Category, Status, Brand, PriceRange,   │
//! │       │     StockStatus in_stock/out_of_stock (list mode only)         │
//! │       │                                                                 │
//! │       └── post_filters()  ──► applied to the fetched page in memory    │
//! │             StockStatus low_stock (stock <= own minimum), and every    │
//! │             StockStatus filter in search mode                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Post-filters run after LIMIT/OFFSET, so a filtered page can hold fewer
//! rows than `limit` while later pages still hold matches. The pagination
//! block reports that honestly: `total` is the filtered count of this page
//! and `totalPages` is derived from the unfiltered store count.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{ValidationError, ValidationErrors};
use crate::stock::StockStatus;
use crate::types::{Product, ProductCategory, ProductStatus};
use crate::validation::{parse_whole_number, validate_search_query};

// =============================================================================
// Query Mode
// =============================================================================

/// Which endpoint built the query. Decides filter placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// Catalogue listing (`GET /api/products`).
    List,
    /// Advanced search (`GET /api/products/search`).
    Search,
}

// =============================================================================
// Stock Status Filter
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatusFilter {
    /// stock > 0
    InStock,
    /// 0 < stock <= min_stock_level
    LowStock,
    /// stock == 0
    OutOfStock,
}

impl StockStatusFilter {
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            StockStatusFilter::InStock => product.available_stock > 0,
            StockStatusFilter::LowStock => product.stock_status() == StockStatus::LowStock,
            StockStatusFilter::OutOfStock => product.available_stock == 0,
        }
    }
}

impl FromStr for StockStatusFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_stock" => Ok(StockStatusFilter::InStock),
            "low_stock" => Ok(StockStatusFilter::LowStock),
            "out_of_stock" => Ok(StockStatusFilter::OutOfStock),
            _ => Err(ValidationError::NotAllowed {
                field: "stockStatus".to_string(),
                allowed: vec![
                    "in_stock".to_string(),
                    "low_stock".to_string(),
                    "out_of_stock".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Product Filter
// =============================================================================

/// One predicate over products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductFilter {
    /// Case-insensitive substring over name, brand, model, hardware id and
    /// description.
    Search { text: String },
    /// Exact equality against name, brand, model or hardware id.
    ExactMatch { text: String },
    Category(ProductCategory),
    Status(ProductStatus),
    /// Case-insensitive substring on brand.
    Brand { contains: String },
    /// Inclusive bounds on selling price.
    PriceRange { min: Option<i64>, max: Option<i64> },
    StockStatus(StockStatusFilter),
}

impl ProductFilter {
    /// Whether the persistence gateway evaluates this filter.
    ///
    /// The store cannot compare two columns of the same row in its filter
    /// language, so `low_stock` always stays in the application. The search
    /// endpoint keeps every stock filter in the application.
    pub fn is_pushdown(&self, mode: QueryMode) -> bool {
        match self {
            ProductFilter::StockStatus(StockStatusFilter::LowStock) => false,
            ProductFilter::StockStatus(_) => mode == QueryMode::List,
            _ => true,
        }
    }

    /// In-memory evaluation, used for post-filters.
    pub fn matches(&self, product: &Product) -> bool {
        fn contains(haystack: &str, needle: &str) -> bool {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        }

        match self {
            ProductFilter::Search { text } => {
                contains(&product.name, text)
                    || contains(&product.brand, text)
                    || contains(&product.model, text)
                    || contains(&product.hardware_id, text)
                    || product
                        .description
                        .as_deref()
                        .is_some_and(|d| contains(d, text))
            }
            ProductFilter::ExactMatch { text } => {
                product.name == *text
                    || product.brand == *text
                    || product.model == *text
                    || product.hardware_id == *text
            }
            ProductFilter::Category(category) => product.category == *category,
            ProductFilter::Status(status) => product.status == *status,
            ProductFilter::Brand { contains: brand } => contains(&product.brand, brand),
            ProductFilter::PriceRange { min, max } => {
                min.map_or(true, |m| product.selling_price >= m)
                    && max.map_or(true, |m| product.selling_price <= m)
            }
            ProductFilter::StockStatus(status) => status.matches(product),
        }
    }
}

// =============================================================================
// Sorting
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Brand,
    SellingPrice,
    AvailableStock,
    CreatedAt,
}

impl FromStr for SortField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortField::Name),
            "brand" => Ok(SortField::Brand),
            "sellingPrice" => Ok(SortField::SellingPrice),
            "availableStock" => Ok(SortField::AvailableStock),
            "createdAt" => Ok(SortField::CreatedAt),
            _ => Err(ValidationError::NotAllowed {
                field: "sortBy".to_string(),
                allowed: ["name", "brand", "sellingPrice", "availableStock", "createdAt"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ValidationError::NotAllowed {
                field: "sortOrder".to_string(),
                allowed: vec!["asc".to_string(), "desc".to_string()],
            }),
        }
    }
}

/// Sort field and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl Default for SortSpec {
    /// Newest first.
    fn default() -> Self {
        SortSpec {
            field: SortField::CreatedAt,
            order: SortOrder::Desc,
        }
    }
}

impl SortSpec {
    /// Without `sortBy` the default applies and `sortOrder` is ignored.
    /// With `sortBy`, the order defaults to ascending.
    fn from_params(
        sort_by: Option<&str>,
        sort_order: Option<&str>,
        errors: &mut ValidationErrors,
    ) -> SortSpec {
        let order = match non_blank(sort_order) {
            Some(o) => errors.check(o.parse::<SortOrder>()),
            None => Some(SortOrder::Asc),
        };
        match non_blank(sort_by) {
            None => SortSpec::default(),
            Some(field) => match (errors.check(field.parse::<SortField>()), order) {
                (Some(field), Some(order)) => SortSpec { field, order },
                _ => SortSpec::default(),
            },
        }
    }
}

// =============================================================================
// Paging
// =============================================================================

/// Limits applied when reading page sizes from a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        PageLimits {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

/// A 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    fn from_params(
        page: Option<&str>,
        limit: Option<&str>,
        limits: PageLimits,
        errors: &mut ValidationErrors,
    ) -> PageRequest {
        let page = match non_blank(page) {
            None => 1,
            Some(p) => errors.check(parse_positive("page", p)).unwrap_or(1),
        };
        let limit = match non_blank(limit) {
            None => limits.default_limit,
            Some(l) => errors
                .check(parse_positive("limit", l))
                .map(|l| l.min(limits.max_limit))
                .unwrap_or(limits.default_limit),
        };
        PageRequest { page, limit }
    }
}

fn parse_positive(field: &str, value: &str) -> Result<u32, ValidationError> {
    let n = parse_whole_number(field, Some(value))?;
    u32::try_from(n)
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| ValidationError::MustBePositive {
            field: field.to_string(),
        })
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Query string of `GET /api/products`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub stock_status: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Query string of `GET /api/products/search`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub query: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub stock_status: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub exact_match: Option<String>,
    pub include_inactive: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn flag(value: Option<&str>) -> bool {
    value == Some("true")
}

fn price_bound(field: &str, value: Option<&str>, errors: &mut ValidationErrors) -> Option<i64> {
    non_blank(value).and_then(|v| errors.check(parse_whole_number(field, Some(v))))
}

// =============================================================================
// Product Query
// =============================================================================

/// Immutable product query. Construct with [`ProductQuery::from_list_params`],
/// [`ProductQuery::from_search_params`] or [`ProductQuery::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    mode: QueryMode,
    filters: Vec<ProductFilter>,
    sort: SortSpec,
    page: PageRequest,
}

impl ProductQuery {
    pub fn new(
        mode: QueryMode,
        filters: Vec<ProductFilter>,
        sort: SortSpec,
        page: PageRequest,
    ) -> Self {
        ProductQuery {
            mode,
            filters,
            sort,
            page,
        }
    }

    /// Builds the catalogue listing query. Every invalid parameter is
    /// reported; no partially parsed query is returned.
    pub fn from_list_params(
        params: &ListParams,
        limits: PageLimits,
    ) -> Result<ProductQuery, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut filters = Vec::new();

        if let Some(text) = non_blank(params.search.as_deref()) {
            if let Some(text) = errors.check(validate_search_query(text)) {
                filters.push(ProductFilter::Search { text });
            }
        }
        if let Some(category) = non_blank(params.category.as_deref()) {
            if let Some(c) = errors.check(parse_category(category)) {
                filters.push(ProductFilter::Category(c));
            }
        }
        if let Some(status) = non_blank(params.status.as_deref()) {
            if let Some(s) = errors.check(parse_status(status)) {
                filters.push(ProductFilter::Status(s));
            }
        }
        let min = price_bound("minPrice", params.min_price.as_deref(), &mut errors);
        let max = price_bound("maxPrice", params.max_price.as_deref(), &mut errors);
        if min.is_some() || max.is_some() {
            filters.push(ProductFilter::PriceRange { min, max });
        }
        if let Some(stock) = non_blank(params.stock_status.as_deref()) {
            if let Some(s) = errors.check(stock.parse::<StockStatusFilter>()) {
                filters.push(ProductFilter::StockStatus(s));
            }
        }

        let sort = SortSpec::from_params(
            params.sort_by.as_deref(),
            params.sort_order.as_deref(),
            &mut errors,
        );
        let page = PageRequest::from_params(
            params.page.as_deref(),
            params.limit.as_deref(),
            limits,
            &mut errors,
        );

        errors.into_result(|| ProductQuery::new(QueryMode::List, filters, sort, page))
    }

    /// Builds the advanced search query. Unless `includeInactive=true`, only
    /// ACTIVE products match.
    pub fn from_search_params(
        params: &SearchParams,
        limits: PageLimits,
    ) -> Result<ProductQuery, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut filters = Vec::new();

        if let Some(text) = non_blank(params.query.as_deref()) {
            if let Some(text) = errors.check(validate_search_query(text)) {
                if flag(params.exact_match.as_deref()) {
                    filters.push(ProductFilter::ExactMatch { text });
                } else {
                    filters.push(ProductFilter::Search { text });
                }
            }
        }
        if let Some(brand) = non_blank(params.brand.as_deref()) {
            filters.push(ProductFilter::Brand {
                contains: brand.to_string(),
            });
        }
        if let Some(category) = non_blank(params.category.as_deref()) {
            if let Some(c) = errors.check(parse_category(category)) {
                filters.push(ProductFilter::Category(c));
            }
        }
        if !flag(params.include_inactive.as_deref()) {
            filters.push(ProductFilter::Status(ProductStatus::Active));
        }
        let min = price_bound("priceMin", params.price_min.as_deref(), &mut errors);
        let max = price_bound("priceMax", params.price_max.as_deref(), &mut errors);
        if min.is_some() || max.is_some() {
            filters.push(ProductFilter::PriceRange { min, max });
        }
        if let Some(stock) = non_blank(params.stock_status.as_deref()) {
            if let Some(s) = errors.check(stock.parse::<StockStatusFilter>()) {
                filters.push(ProductFilter::StockStatus(s));
            }
        }

        let sort = SortSpec::from_params(
            params.sort_by.as_deref(),
            params.sort_order.as_deref(),
            &mut errors,
        );
        let page = PageRequest::from_params(
            params.page.as_deref(),
            params.limit.as_deref(),
            limits,
            &mut errors,
        );

        errors.into_result(|| ProductQuery::new(QueryMode::Search, filters, sort, page))
    }

    pub fn mode(&self) -> QueryMode {
        self.mode
    }

    pub fn filters(&self) -> &[ProductFilter] {
        &self.filters
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn page(&self) -> PageRequest {
        self.page
    }

    /// Filters the persistence gateway must evaluate.
    pub fn store_filters(&self) -> impl Iterator<Item = &ProductFilter> {
        self.filters.iter().filter(move |f| f.is_pushdown(self.mode))
    }

    /// Filters evaluated in memory on the fetched page.
    pub fn post_filters(&self) -> impl Iterator<Item = &ProductFilter> {
        self.filters.iter().filter(move |f| !f.is_pushdown(self.mode))
    }

    pub fn has_post_filters(&self) -> bool {
        self.post_filters().next().is_some()
    }

    /// The free-text term, if any, with its exact-match flag.
    pub fn text_term(&self) -> Option<(&str, bool)> {
        self.filters.iter().find_map(|f| match f {
            ProductFilter::Search { text } => Some((text.as_str(), false)),
            ProductFilter::ExactMatch { text } => Some((text.as_str(), true)),
            _ => None,
        })
    }

    /// Applies post-filters to a page fetched with the store filters and
    /// assembles the paginated result.
    pub fn finish_page(&self, fetched: Vec<Product>, store_count: u64) -> Page<Product> {
        let post_filtered = self.has_post_filters();
        let items: Vec<Product> = fetched
            .into_iter()
            .filter(|p| self.post_filters().all(|f| f.matches(p)))
            .collect();

        let total = if post_filtered {
            items.len() as u64
        } else {
            store_count
        };
        let limit = u64::from(self.page.limit.max(1));

        Page {
            items,
            pagination: Pagination {
                page: self.page.page,
                limit: self.page.limit,
                total,
                total_pages: store_count.div_ceil(limit),
            },
        }
    }
}

fn parse_category(value: &str) -> Result<ProductCategory, ValidationError> {
    value.parse().map_err(|_| ValidationError::NotAllowed {
        field: "category".to_string(),
        allowed: ProductCategory::NAMES.iter().map(|s| s.to_string()).collect(),
    })
}

fn parse_status(value: &str) -> Result<ProductStatus, ValidationError> {
    value.parse().map_err(|_| ValidationError::NotAllowed {
        field: "status".to_string(),
        allowed: ProductStatus::NAMES.iter().map(|s| s.to_string()).collect(),
    })
}

// =============================================================================
// Results
// =============================================================================

/// Pagination block echoed to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

/// Search block of the advanced search envelope, present when a text term
/// was given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SearchMetadata {
    pub query: String,
    pub exact_match: bool,
    pub results_found: u64,
    /// Elapsed milliseconds spent answering the search.
    pub search_time: u64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(name: &str, stock: i64, min: i64) -> Product {
        Product {
            id: name.to_string(),
            name: name.to_string(),
            brand: "Tecno".to_string(),
            model: "Spark 20".to_string(),
            purchase_price: 50_000,
            selling_price: 65_000,
            hardware_id: "356938035643809".to_string(),
            available_stock: stock,
            min_stock_level: min,
            description: Some("Dual SIM".to_string()),
            images: vec![],
            category: ProductCategory::Phone,
            status: ProductStatus::Active,
            created_by: "u".to_string(),
            updated_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_list_defaults() {
        let query = ProductQuery::from_list_params(&ListParams::default(), PageLimits::default())
            .unwrap();
        assert_eq!(query.mode(), QueryMode::List);
        assert!(query.filters().is_empty());
        assert_eq!(query.sort(), SortSpec::default());
        assert_eq!(query.page(), PageRequest { page: 1, limit: 10 });
    }

    #[test]
    fn test_list_params_build_filters() {
        let params = ListParams {
            search: Some("spark".into()),
            category: Some("PHONE".into()),
            min_price: Some("1000".into()),
            stock_status: Some("low_stock".into()),
            sort_by: Some("sellingPrice".into()),
            page: Some("2".into()),
            limit: Some("500".into()),
            ..Default::default()
        };
        let query = ProductQuery::from_list_params(&params, PageLimits::default()).unwrap();

        assert_eq!(
            query.filters(),
            &[
                ProductFilter::Search {
                    text: "spark".into()
                },
                ProductFilter::Category(ProductCategory::Phone),
                ProductFilter::PriceRange {
                    min: Some(1000),
                    max: None
                },
                ProductFilter::StockStatus(StockStatusFilter::LowStock),
            ]
        );
        assert_eq!(
            query.sort(),
            SortSpec {
                field: SortField::SellingPrice,
                order: SortOrder::Asc
            }
        );
        assert_eq!(query.page(), PageRequest { page: 2, limit: 100 });
        assert_eq!(query.page().offset(), 100);
        assert_eq!(query.store_filters().count(), 3);
        assert_eq!(query.post_filters().count(), 1);
    }

    #[test]
    fn test_invalid_params_are_all_reported() {
        let params = ListParams {
            category: Some("TABLET".into()),
            stock_status: Some("plenty".into()),
            sort_by: Some("price".into()),
            sort_order: Some("up".into()),
            page: Some("abc".into()),
            ..Default::default()
        };
        let errors = ProductQuery::from_list_params(&params, PageLimits::default()).unwrap_err();
        for field in ["category", "stockStatus", "sortBy", "sortOrder", "page"] {
            assert!(errors.has_field(field), "missing {field}");
        }
    }

    #[test]
    fn test_stock_placement_by_mode() {
        let in_stock = ProductFilter::StockStatus(StockStatusFilter::InStock);
        let low = ProductFilter::StockStatus(StockStatusFilter::LowStock);
        assert!(in_stock.is_pushdown(QueryMode::List));
        assert!(!in_stock.is_pushdown(QueryMode::Search));
        assert!(!low.is_pushdown(QueryMode::List));
        assert!(ProductFilter::Category(ProductCategory::Phone).is_pushdown(QueryMode::Search));
    }

    #[test]
    fn test_search_params() {
        let params = SearchParams {
            query: Some("Tecno".into()),
            exact_match: Some("true".into()),
            ..Default::default()
        };
        let limits = PageLimits {
            default_limit: 20,
            max_limit: 100,
        };
        let query = ProductQuery::from_search_params(&params, limits).unwrap();
        assert_eq!(query.text_term(), Some(("Tecno", true)));
        assert!(query
            .filters()
            .contains(&ProductFilter::Status(ProductStatus::Active)));
        assert_eq!(query.page().limit, 20);

        let params = SearchParams {
            include_inactive: Some("true".into()),
            ..Default::default()
        };
        let query = ProductQuery::from_search_params(&params, limits).unwrap();
        assert!(query.filters().is_empty());
        assert_eq!(query.text_term(), None);
    }

    #[test]
    fn test_filter_matching() {
        let p = product("Spark", 3, 5);
        assert!(ProductFilter::Search { text: "dual".into() }.matches(&p));
        assert!(ProductFilter::Search { text: "TECNO".into() }.matches(&p));
        assert!(!ProductFilter::ExactMatch { text: "tecno".into() }.matches(&p));
        assert!(ProductFilter::ExactMatch { text: "Tecno".into() }.matches(&p));
        assert!(ProductFilter::PriceRange {
            min: Some(65_000),
            max: Some(65_000)
        }
        .matches(&p));
        assert!(ProductFilter::StockStatus(StockStatusFilter::LowStock).matches(&p));
        assert!(!ProductFilter::StockStatus(StockStatusFilter::OutOfStock).matches(&p));
    }

    #[test]
    fn test_finish_page_without_post_filter_reports_store_count() {
        let query = ProductQuery::from_list_params(&ListParams::default(), PageLimits::default())
            .unwrap();
        let page = query.finish_page(vec![product("a", 10, 5), product("b", 1, 5)], 25);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.pagination.total, 25);
        assert_eq!(page.pagination.total_pages, 3);
    }

    #[test]
    fn test_finish_page_with_post_filter_reports_filtered_count() {
        let params = ListParams {
            stock_status: Some("low_stock".into()),
            ..Default::default()
        };
        let query = ProductQuery::from_list_params(&params, PageLimits::default()).unwrap();
        let fetched = vec![product("a", 10, 5), product("b", 1, 5), product("c", 0, 5)];
        let page = query.finish_page(fetched, 30);

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "b");
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.pagination.total_pages, 3);
    }
}
