//! History (audit trail) entity models.
//!
//! Entries are immutable once created, so there is no `updated_at` and no
//! update DTO.

use reelhouse_core::audit::ActionKind;
use reelhouse_core::media::EntityKind;
use reelhouse_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single history entry.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: DbId,
    pub user_id: DbId,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<DbId>,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
    pub title: String,
    pub created_at: Timestamp,
}

/// DTO for inserting a history entry.
#[derive(Debug, Clone)]
pub struct CreateAuditEntry {
    pub user_id: DbId,
    pub action: ActionKind,
    pub entity_type: EntityKind,
    pub entity_id: Option<DbId>,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
    pub title: String,
}

/// History filters as they arrive in the query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuery {
    pub user_id: Option<DbId>,
    pub entity_type: Option<String>,
    pub action: Option<String>,
}

/// Parsed history filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditFilter {
    pub user_id: Option<DbId>,
    pub entity_type: Option<EntityKind>,
    pub action: Option<ActionKind>,
}

impl AuditQuery {
    /// Parse the textual filters, rejecting unknown entity types and actions.
    pub fn parse(&self) -> Result<AuditFilter, reelhouse_core::error::CoreError> {
        Ok(AuditFilter {
            user_id: self.user_id,
            entity_type: self.entity_type.as_deref().map(str::parse).transpose()?,
            action: self.action.as_deref().map(str::parse).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_parses_known_values() {
        let query = AuditQuery {
            user_id: Some(3),
            entity_type: Some("tvShow".into()),
            action: Some("Delete".into()),
        };
        assert_eq!(
            query.parse().unwrap(),
            AuditFilter {
                user_id: Some(3),
                entity_type: Some(EntityKind::TvShow),
                action: Some(ActionKind::Delete),
            }
        );
    }

    #[test]
    fn query_rejects_unknown_action() {
        let query = AuditQuery {
            action: Some("Purge".into()),
            ..Default::default()
        };
        assert!(query.parse().is_err());
    }
}
