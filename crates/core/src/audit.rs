//! History (audit trail) vocabulary and title synthesis.
//!
//! This module lives in `core` (zero internal deps) so the recorder in the
//! API layer and the repository agree on action names and titles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::media::EntityKind;
use crate::types::DbId;

/// How long history entries are kept before the purge task removes them.
pub const RETENTION_DAYS: i64 = 180;

// ---------------------------------------------------------------------------
// Action kinds
// ---------------------------------------------------------------------------

/// What a recorded request did to its entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Add,
    Update,
    Delete,
    Read,
}

impl ActionKind {
    /// Map an HTTP method name to an action kind.
    ///
    /// POST adds, PUT/PATCH update, DELETE deletes. Anything else is a read,
    /// which the recorder is not expected to see in practice.
    pub fn from_method(method: &str) -> Self {
        match method.to_ascii_uppercase().as_str() {
            "POST" => ActionKind::Add,
            "PUT" | "PATCH" => ActionKind::Update,
            "DELETE" => ActionKind::Delete,
            _ => ActionKind::Read,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Add => "Add",
            ActionKind::Update => "Update",
            ActionKind::Delete => "Delete",
            ActionKind::Read => "Read",
        }
    }

    /// Past-tense verb used as the first word of a title.
    pub fn verb(self) -> &'static str {
        match self {
            ActionKind::Add => "Added",
            ActionKind::Update => "Updated",
            ActionKind::Delete => "Deleted",
            ActionKind::Read => "Read",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Add" => Ok(ActionKind::Add),
            "Update" => Ok(ActionKind::Update),
            "Delete" => Ok(ActionKind::Delete),
            "Read" => Ok(ActionKind::Read),
            other => Err(CoreError::Validation(format!("Unknown action '{other}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Title synthesis
// ---------------------------------------------------------------------------

/// Entities whose name takes "an" in an Add title. A fixed list, not a
/// grammar rule: other entity names always take "a".
const AN_ENTITIES: &[EntityKind] = &[EntityKind::Episode, EntityKind::User];

fn article(entity: EntityKind) -> &'static str {
    if AN_ENTITIES.contains(&entity) {
        "an"
    } else {
        "a"
    }
}

/// Build the human-readable title of a history entry.
///
/// - Add: `"Added a new Movie"`, `"Added an new Episode"`
/// - Update/Delete/Read: `"Updated the Season"`
/// - Bulk requests pluralise and drop the article: `"Added new Movies"`,
///   `"Deleted the Episodes"`
pub fn generate_title(action: ActionKind, entity: EntityKind, bulk: bool) -> String {
    let verb = action.verb();
    let name = entity.label();
    match (action, bulk) {
        (ActionKind::Add, false) => format!("{verb} {} new {name}", article(entity)),
        (ActionKind::Add, true) => format!("{verb} new {name}s"),
        (_, false) => format!("{verb} the {name}"),
        (_, true) => format!("{verb} the {name}s"),
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Identity of the entity a snapshot describes, read from its `id` field.
///
/// Bulk snapshots are arrays and carry no single id.
pub fn entity_id_of(snapshot: &serde_json::Value) -> Option<DbId> {
    snapshot.get("id").and_then(serde_json::Value::as_i64)
}

/// Keys whose values never reach the history table.
pub const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "token",
    "secret",
    "authorization",
    "credential",
];

/// Redact sensitive fields from a snapshot, recursing into objects and arrays.
///
/// Replaces the value of any key containing one of [`SENSITIVE_FIELDS`]
/// (case-insensitive) with `"[REDACTED]"`.
pub fn redact_sensitive_fields(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let redacted = map
                .iter()
                .map(|(key, val)| {
                    let lower_key = key.to_lowercase();
                    let val = if SENSITIVE_FIELDS.iter().any(|f| lower_key.contains(f)) {
                        serde_json::Value::String("[REDACTED]".to_string())
                    } else {
                        redact_sensitive_fields(val)
                    };
                    (key.clone(), val)
                })
                .collect();
            serde_json::Value::Object(redacted)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(redact_sensitive_fields).collect())
        }
        other => other.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- from_method ---------------------------------------------------------

    #[test]
    fn methods_map_to_actions() {
        assert_eq!(ActionKind::from_method("POST"), ActionKind::Add);
        assert_eq!(ActionKind::from_method("PUT"), ActionKind::Update);
        assert_eq!(ActionKind::from_method("patch"), ActionKind::Update);
        assert_eq!(ActionKind::from_method("DELETE"), ActionKind::Delete);
        assert_eq!(ActionKind::from_method("GET"), ActionKind::Read);
        assert_eq!(ActionKind::from_method("OPTIONS"), ActionKind::Read);
    }

    #[test]
    fn action_round_trips_through_storage_name() {
        for action in [
            ActionKind::Add,
            ActionKind::Update,
            ActionKind::Delete,
            ActionKind::Read,
        ] {
            assert_eq!(action.as_str().parse::<ActionKind>().unwrap(), action);
        }
        assert!("add".parse::<ActionKind>().is_err());
    }

    // -- generate_title ------------------------------------------------------

    #[test]
    fn add_episode_uses_an() {
        assert_eq!(
            generate_title(ActionKind::Add, EntityKind::Episode, false),
            "Added an new Episode"
        );
    }

    #[test]
    fn add_user_uses_an() {
        assert_eq!(
            generate_title(ActionKind::Add, EntityKind::User, false),
            "Added an new User"
        );
    }

    #[test]
    fn add_other_entities_use_a() {
        assert_eq!(
            generate_title(ActionKind::Add, EntityKind::Movie, false),
            "Added a new Movie"
        );
        assert_eq!(
            generate_title(ActionKind::Add, EntityKind::TvShow, false),
            "Added a new TV Show"
        );
        assert_eq!(
            generate_title(ActionKind::Add, EntityKind::Season, false),
            "Added a new Season"
        );
    }

    #[test]
    fn update_and_delete_use_the() {
        assert_eq!(
            generate_title(ActionKind::Update, EntityKind::Game, false),
            "Updated the Game"
        );
        assert_eq!(
            generate_title(ActionKind::Delete, EntityKind::Episode, false),
            "Deleted the Episode"
        );
    }

    #[test]
    fn bulk_titles_are_plural() {
        assert_eq!(
            generate_title(ActionKind::Add, EntityKind::Movie, true),
            "Added new Movies"
        );
        assert_eq!(
            generate_title(ActionKind::Delete, EntityKind::TvShow, true),
            "Deleted the TV Shows"
        );
    }

    // -- snapshots -----------------------------------------------------------

    #[test]
    fn entity_id_read_from_object_only() {
        assert_eq!(entity_id_of(&serde_json::json!({"id": 12, "title": "x"})), Some(12));
        assert_eq!(entity_id_of(&serde_json::json!([{"id": 1}])), None);
        assert_eq!(entity_id_of(&serde_json::json!({"title": "x"})), None);
    }

    #[test]
    fn redacts_password_hash() {
        let input = serde_json::json!({"username": "alice", "passwordHash": "$argon2id$..."});
        let result = redact_sensitive_fields(&input);
        assert_eq!(result["username"], "alice");
        assert_eq!(result["passwordHash"], "[REDACTED]");
    }

    #[test]
    fn redacts_inside_arrays_and_nested_objects() {
        let input = serde_json::json!([{"user": {"accessToken": "abc", "id": 3}}]);
        let result = redact_sensitive_fields(&input);
        assert_eq!(result[0]["user"]["accessToken"], "[REDACTED]");
        assert_eq!(result[0]["user"]["id"], 3);
    }
}
