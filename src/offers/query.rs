use serde::Deserialize;

/// Fixed page size for offer listings.
pub const PAGE_SIZE: i64 = 3;

/// Raw query-string parameters of GET /offers.
#[derive(Debug, Default, Deserialize)]
pub struct OfferListParams {
    pub title: Option<String>,
    #[serde(rename = "priceMin")]
    pub price_min: Option<f64>,
    #[serde(rename = "priceMax")]
    pub price_max: Option<f64>,
    pub sort: Option<String>,
    pub page: Option<i64>,
}

/// Filter portion of the derived query. Bounds are inclusive and ANDed;
/// min > max is allowed and simply matches nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferFilter {
    pub title: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
}

impl OfferFilter {
    /// Unanchored ILIKE pattern for the title term, with LIKE
    /// metacharacters escaped so user input stays literal.
    pub fn title_pattern(&self) -> Option<String> {
        self.title
            .as_ref()
            .map(|t| format!("%{}%", escape_like(t)))
    }
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferSort {
    PriceAsc,
    PriceDesc,
    /// Absent or unrecognized param: leave the store's natural order.
    Unsorted,
}

impl OfferSort {
    fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("price-asc") => OfferSort::PriceAsc,
            Some("price-desc") => OfferSort::PriceDesc,
            _ => OfferSort::Unsorted,
        }
    }

    pub fn order_clause(&self) -> &'static str {
        match self {
            OfferSort::PriceAsc => "ORDER BY o.price ASC",
            OfferSort::PriceDesc => "ORDER BY o.price DESC",
            OfferSort::Unsorted => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

fn page_offset(page: Option<i64>) -> i64 {
    match page {
        // saturate so an absurd page value cannot wrap into a negative offset
        Some(p) if p > 1 => PAGE_SIZE.saturating_mul(p).saturating_sub(PAGE_SIZE),
        _ => 0,
    }
}

/// Translate request parameters into the filter/sort/pagination triple.
/// Pure; the store applies it.
pub fn build_query(params: &OfferListParams) -> (OfferFilter, OfferSort, Page) {
    let filter = OfferFilter {
        title: params.title.clone(),
        price_min: params.price_min,
        price_max: params.price_max,
    };
    let sort = OfferSort::from_param(params.sort.as_deref());
    let page = Page {
        offset: page_offset(params.page),
        limit: PAGE_SIZE,
    };
    (filter, sort, page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<i64>) -> OfferListParams {
        OfferListParams {
            page,
            ..Default::default()
        }
    }

    #[test]
    fn pages_at_or_below_one_start_at_zero() {
        for p in [None, Some(0), Some(1), Some(-4)] {
            let (_, _, page) = build_query(&params(p));
            assert_eq!(page.offset, 0, "page {:?}", p);
            assert_eq!(page.limit, PAGE_SIZE);
        }
    }

    #[test]
    fn later_pages_step_by_page_size() {
        let (_, _, page) = build_query(&params(Some(2)));
        assert_eq!(page.offset, 3);
        let (_, _, page) = build_query(&params(Some(5)));
        assert_eq!(page.offset, 12);
    }

    #[test]
    fn huge_page_values_saturate_instead_of_wrapping() {
        let (_, _, page) = build_query(&params(Some(i64::MAX)));
        assert!(page.offset > 0);
        assert_eq!(page.limit, PAGE_SIZE);
    }

    #[test]
    fn sort_param_maps_to_price_order() {
        let mut p = OfferListParams::default();
        p.sort = Some("price-asc".into());
        assert_eq!(build_query(&p).1, OfferSort::PriceAsc);
        p.sort = Some("price-desc".into());
        assert_eq!(build_query(&p).1, OfferSort::PriceDesc);
        p.sort = Some("newest".into());
        assert_eq!(build_query(&p).1, OfferSort::Unsorted);
        p.sort = None;
        assert_eq!(build_query(&p).1, OfferSort::Unsorted);
    }

    #[test]
    fn order_clauses() {
        assert_eq!(OfferSort::PriceAsc.order_clause(), "ORDER BY o.price ASC");
        assert_eq!(OfferSort::PriceDesc.order_clause(), "ORDER BY o.price DESC");
        assert_eq!(OfferSort::Unsorted.order_clause(), "");
    }

    // min > max is not rejected; both bounds are kept and the store
    // returns an empty page.
    #[test]
    fn inverted_price_bounds_pass_through() {
        let p = OfferListParams {
            price_min: Some(10.0),
            price_max: Some(5.0),
            ..Default::default()
        };
        let (filter, _, _) = build_query(&p);
        assert_eq!(filter.price_min, Some(10.0));
        assert_eq!(filter.price_max, Some(5.0));
    }

    #[test]
    fn title_pattern_is_unanchored_substring() {
        let (filter, _, _) = build_query(&OfferListParams {
            title: Some("jacket".into()),
            ..Default::default()
        });
        assert_eq!(filter.title_pattern().as_deref(), Some("%jacket%"));
    }

    #[test]
    fn title_pattern_escapes_like_metacharacters() {
        let filter = OfferFilter {
            title: Some("100%_wool\\".into()),
            price_min: None,
            price_max: None,
        };
        assert_eq!(
            filter.title_pattern().as_deref(),
            Some("%100\\%\\_wool\\\\%")
        );
    }

    #[test]
    fn absent_title_gives_no_pattern() {
        let filter = OfferFilter {
            title: None,
            price_min: None,
            price_max: None,
        };
        assert_eq!(filter.title_pattern(), None);
    }
}
