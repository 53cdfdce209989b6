//! Query-string handling: filter predicates, sort directives and paging.

use std::collections::HashMap;
use std::num::NonZeroU64;

use catalog_db::{Direction, Filter, SortSpec};

const DEFAULT_LIMIT: u64 = 10;

/// Fields matched exactly when supplied as query parameters.
const EXACT_MATCH_FIELDS: [&str; 3] = ["author_name", "year_of_publication", "condition"];

/// Build a store predicate from raw query parameters.
///
/// Only recognized, non-empty parameters become clauses. `price` is an upper
/// bound; a value that does not parse as a finite number is dropped.
pub fn build_filter(params: &HashMap<String, String>) -> Filter {
    let mut filter = Filter::new();

    for field in EXACT_MATCH_FIELDS {
        if let Some(value) = non_empty(params, field) {
            filter = filter.with_eq(field, value);
        }
    }

    if let Some(raw) = non_empty(params, "price") {
        match raw.trim().parse::<f64>() {
            Ok(max_price) if max_price.is_finite() => filter = filter.with_lte("price", max_price),
            _ => tracing::debug!(price = raw, "ignoring unparseable price filter"),
        }
    }

    filter
}

fn non_empty<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

/// Parse `field:direction` into a sort directive.
///
/// The direction is descending only for the exact token `desc`. Absent,
/// empty or colon-less input, or an empty field name, yields no directive.
pub fn parse_sort(raw: Option<&str>) -> Option<SortSpec> {
    let (field, direction) = raw?.split_once(':')?;
    if field.is_empty() {
        return None;
    }

    let direction = if direction == "desc" {
        Direction::Descending
    } else {
        Direction::Ascending
    };
    Some(SortSpec::new(field, direction))
}

/// Page window derived from `page` / `limit` query values.
///
/// Both values are at least 1, so `skip` and `total_pages` never underflow or
/// divide by zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: NonZeroU64,
    limit: NonZeroU64,
}

impl Pagination {
    /// `None` when either value is zero.
    pub fn new(page: u64, limit: u64) -> Option<Self> {
        Some(Self {
            page: NonZeroU64::new(page)?,
            limit: NonZeroU64::new(limit)?,
        })
    }

    /// Values that are absent or not positive integers fall back to
    /// page 1 and limit 10.
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
        let defaults = Self::default();
        Self {
            page: positive(page).unwrap_or(defaults.page),
            limit: positive(limit).unwrap_or(defaults.limit),
        }
    }

    pub fn page(&self) -> u64 {
        self.page.get()
    }

    pub fn limit(&self) -> u64 {
        self.limit.get()
    }

    /// Records preceding this page.
    pub fn skip(&self) -> u64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    /// Pages needed to show `total` records.
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit())
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: NonZeroU64::MIN,
            limit: NonZeroU64::new(DEFAULT_LIMIT).unwrap_or(NonZeroU64::MIN),
        }
    }
}

fn positive(raw: Option<&str>) -> Option<NonZeroU64> {
    raw?.trim().parse::<u64>().ok().and_then(NonZeroU64::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_db::Clause;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn no_params_builds_match_all_filter() {
        let filter = build_filter(&HashMap::new());
        assert!(filter.is_empty());
        assert_eq!(filter, build_filter(&params(&[("sort", "price:desc"), ("page", "2")])));
    }

    #[test]
    fn supplied_fields_become_clauses() {
        let filter = build_filter(&params(&[
            ("author_name", "Le Guin"),
            ("year_of_publication", "1969"),
            ("condition", "used"),
            ("price", "20"),
            ("publisher", "Ace"),
        ]));

        assert_eq!(
            filter.clauses(),
            &[
                Clause::Eq {
                    field: "author_name".to_string(),
                    value: json!("Le Guin"),
                },
                Clause::Eq {
                    field: "year_of_publication".to_string(),
                    value: json!("1969"),
                },
                Clause::Eq {
                    field: "condition".to_string(),
                    value: json!("used"),
                },
                Clause::Lte {
                    field: "price".to_string(),
                    value: 20.0,
                },
            ]
        );
    }

    #[test]
    fn empty_and_unparseable_values_are_dropped() {
        let filter = build_filter(&params(&[("author_name", ""), ("price", "cheap")]));
        assert!(filter.is_empty());

        let filter = build_filter(&params(&[("price", "NaN")]));
        assert!(filter.is_empty());
    }

    #[test]
    fn sort_direction_parsing() {
        assert_eq!(
            parse_sort(Some("price:desc")),
            Some(SortSpec::new("price", Direction::Descending))
        );
        assert_eq!(
            parse_sort(Some("book_name:asc")),
            Some(SortSpec::new("book_name", Direction::Ascending))
        );
        assert_eq!(
            parse_sort(Some("price:DESC")),
            Some(SortSpec::new("price", Direction::Ascending))
        );
        assert_eq!(
            parse_sort(Some("price:")),
            Some(SortSpec::new("price", Direction::Ascending))
        );
    }

    #[test]
    fn malformed_sort_yields_nothing() {
        assert_eq!(parse_sort(Some("price")), None);
        assert_eq!(parse_sort(Some("")), None);
        assert_eq!(parse_sort(Some(":desc")), None);
        assert_eq!(parse_sort(None), None);
    }

    #[test]
    fn pagination_defaults() {
        assert_eq!(Pagination::from_params(None, None), Pagination::default());
        assert_eq!(
            Pagination::from_params(Some("0"), Some("-5")),
            Pagination::new(1, 10).unwrap()
        );
        assert_eq!(
            Pagination::from_params(Some("abc"), Some("2.5")),
            Pagination::new(1, 10).unwrap()
        );
    }

    #[test]
    fn pagination_arithmetic() {
        let pagination = Pagination::from_params(Some("3"), Some("10"));
        assert_eq!(pagination.skip(), 20);
        assert_eq!(pagination.total_pages(25), 3);
        assert_eq!(pagination.total_pages(30), 3);
        assert_eq!(pagination.total_pages(0), 0);

        assert_eq!(Pagination::default().skip(), 0);
        assert_eq!(Pagination::new(1, 7).unwrap().total_pages(1), 1);
    }

    #[test]
    fn huge_page_saturates_skip() {
        let pagination = Pagination::new(u64::MAX, u64::MAX).unwrap();
        assert_eq!(pagination.skip(), u64::MAX);
    }

    #[test]
    fn zero_page_or_limit_is_unrepresentable() {
        assert_eq!(Pagination::new(0, 10), None);
        assert_eq!(Pagination::new(1, 0), None);

        let pagination = Pagination::from_params(Some("0"), Some("0"));
        assert_eq!((pagination.page(), pagination.limit()), (1, 10));
        assert_eq!(pagination.skip(), 0);
        assert_eq!(pagination.total_pages(0), 0);
    }
}
