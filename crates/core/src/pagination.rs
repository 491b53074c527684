//! Pagination parameters and response metadata shared by every list endpoint.
//!
//! Raw query values are accepted as strings and never rejected: anything that
//! is not a usable number falls back to the configured default.

use serde::{Deserialize, Serialize};

/// Bounds applied to a requested page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitBounds {
    pub min: i64,
    pub max: i64,
    pub default: i64,
}

/// Limits for [`compute_pagination_params`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationLimits {
    pub limit: LimitBounds,
    /// Offset used when neither `start` nor `page` is given.
    pub start_default: i64,
}

/// Default page size when the request does not name one.
pub const DEFAULT_LIMIT: i64 = 20;

/// Largest page size a client may request.
pub const MAX_LIMIT: i64 = 50;

impl Default for PaginationLimits {
    fn default() -> Self {
        Self {
            limit: LimitBounds {
                min: 1,
                max: MAX_LIMIT,
                default: DEFAULT_LIMIT,
            },
            start_default: 0,
        }
    }
}

/// Pagination fields as they arrive in the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPagination {
    pub limit: Option<String>,
    pub start: Option<String>,
    pub page: Option<String>,
}

/// A resolved, always-valid page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub limit: i64,
    pub start: i64,
}

/// Interpret a raw query value as a number.
///
/// Fractions are truncated toward zero. Zero counts as absent so that
/// `limit=0` resolves to the default.
fn numeric(value: Option<&str>) -> Option<i64> {
    let parsed = value?.trim().parse::<f64>().ok()?;
    if !parsed.is_finite() {
        return None;
    }
    let truncated = parsed.trunc();
    if truncated == 0.0 {
        None
    } else {
        // `as` saturates for out-of-range floats.
        Some(truncated as i64)
    }
}

/// Resolve raw `limit` / `start` / `page` into a [`PageRequest`].
///
/// `page` (1-based) wins over `start` when both are present.
pub fn compute_pagination_params(raw: &RawPagination, limits: &PaginationLimits) -> PageRequest {
    let bounds = limits.limit;
    let min = bounds.min.max(1);
    let max = bounds.max.max(min);

    let limit = numeric(raw.limit.as_deref())
        .unwrap_or(bounds.default)
        .max(min)
        .min(max);

    let start = match raw.page.as_deref() {
        Some(page) => {
            let page = numeric(Some(page)).unwrap_or(1).max(1);
            (page - 1).saturating_mul(limit)
        }
        None => numeric(raw.start.as_deref())
            .unwrap_or(limits.start_default)
            .max(0),
    };

    PageRequest { limit, start }
}

/// Pagination envelope attached to every list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub total: i64,
    pub start: i64,
    pub limit: i64,
    pub current_page: i64,
    pub total_pages: i64,
    pub has_more: bool,
    pub has_previous: bool,
    pub next_page: Option<i64>,
    pub previous_page: Option<i64>,
}

/// Build the envelope for a page of `limit` items starting at `start`.
pub fn compute_pagination_response(total: i64, limit: i64, start: i64) -> PaginationMeta {
    // Callers pass limits from `compute_pagination_params`, which are >= 1.
    let divisor = limit.max(1);
    let total = total.max(0);

    let current_page = start / divisor + 1;
    let total_pages = (total + divisor - 1) / divisor;

    PaginationMeta {
        total,
        start,
        limit,
        current_page,
        total_pages,
        has_more: start.saturating_add(limit) < total,
        has_previous: start > 0,
        next_page: (current_page < total_pages).then_some(current_page + 1),
        previous_page: (current_page > 1).then_some(current_page - 1),
    }
}

/// One page of results plus its envelope: `{items, pagination}`.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            pagination: compute_pagination_response(total, request.limit, request.start),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
