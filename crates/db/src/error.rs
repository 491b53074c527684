//! Failures of multi-row writes and deletes run inside one transaction.

use reelhouse_core::error::CoreError;
use reelhouse_core::media::EntityKind;
use reelhouse_core::types::DbId;

/// Error raised by the show tree writer/deleter and by bulk operations.
///
/// Any variant means the surrounding transaction must be rolled back.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// A parent (on write) or a target (on delete) does not exist.
    #[error("{} with id {id} not found", .entity.label())]
    NotFound { entity: EntityKind, id: DbId },

    /// An insert failed. `label` is the title of the failing item.
    #[error("Failed to save {} '{label}'", .entity.label())]
    WriteFailed {
        entity: EntityKind,
        label: String,
        #[source]
        source: sqlx::Error,
    },

    /// A delete failed for a reason other than a missing row.
    #[error("Failed to delete {} with id {id}", .entity.label())]
    DeleteFailed {
        entity: EntityKind,
        id: DbId,
        #[source]
        source: sqlx::Error,
    },

    /// Transaction bookkeeping (begin/commit) or a lookup failed.
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// The batch itself is invalid (e.g. empty).
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl TreeError {
    pub fn not_found(entity: EntityKind, id: DbId) -> Self {
        TreeError::NotFound { entity, id }
    }

    /// The underlying database error, if any.
    pub fn sqlx_source(&self) -> Option<&sqlx::Error> {
        match self {
            TreeError::WriteFailed { source, .. } | TreeError::DeleteFailed { source, .. } => {
                Some(source)
            }
            TreeError::Database(err) => Some(err),
            TreeError::NotFound { .. } | TreeError::Core(_) => None,
        }
    }
}

/// PostgreSQL SQLSTATE for unique violations.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Whether `err` is a unique-constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_entity_and_item() {
        let err = TreeError::not_found(EntityKind::TvShow, 9);
        assert_eq!(err.to_string(), "TV Show with id 9 not found");

        let err = TreeError::WriteFailed {
            entity: EntityKind::Episode,
            label: "Pilot".into(),
            source: sqlx::Error::RowNotFound,
        };
        assert_eq!(err.to_string(), "Failed to save Episode 'Pilot'");
    }

    #[test]
    fn row_not_found_is_not_a_unique_violation() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
