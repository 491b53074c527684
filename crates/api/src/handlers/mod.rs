//! HTTP handlers, one module per resource.

pub mod auth;
pub mod comments;
pub mod episodes;
pub mod games;
pub mod history;
pub mod movies;
pub mod seasons;
pub mod shows;
pub mod users;

use reelhouse_core::error::CoreError;
use reelhouse_core::pagination::{compute_pagination_params, PageRequest, RawPagination};
use reelhouse_core::types::DbId;
use serde::Deserialize;

use crate::state::AppState;

/// Request body for bulk deletes: `{"ids": [1, 2, 3]}`.
#[derive(Debug, Deserialize)]
pub struct BulkIds {
    pub ids: Vec<DbId>,
}

/// Resolve raw pagination parameters against the configured limits.
pub(crate) fn page_request(state: &AppState, raw: &RawPagination) -> PageRequest {
    compute_pagination_params(raw, &state.config.pagination)
}

/// Check every item of a bulk payload, prefixing messages with the item index.
pub(crate) fn check_each<T>(
    items: &[T],
    check: impl Fn(&T) -> Result<(), CoreError>,
) -> Result<(), CoreError> {
    for (index, item) in items.iter().enumerate() {
        if let Err(err) = check(item) {
            let message = match err {
                CoreError::Validation(msg) => msg,
                other => other.to_string(),
            };
            return Err(CoreError::Validation(format!("[{index}] {message}")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn check_each_names_the_failing_index() {
        let items = [1, 2, -3];
        let result = check_each(&items, |n| {
            if *n < 0 {
                Err(CoreError::Validation("value: must be positive".into()))
            } else {
                Ok(())
            }
        });
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg == "[2] value: must be positive");
    }
}
