//! Catalog entity kinds and polymorphic references between them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Every entity type that can appear in the history trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Movie,
    Game,
    TvShow,
    Season,
    Episode,
    User,
    Comment,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Movie,
        EntityKind::Game,
        EntityKind::TvShow,
        EntityKind::Season,
        EntityKind::Episode,
        EntityKind::User,
        EntityKind::Comment,
    ];

    /// Stable storage key (matches the serde representation).
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Movie => "movie",
            EntityKind::Game => "game",
            EntityKind::TvShow => "tvShow",
            EntityKind::Season => "season",
            EntityKind::Episode => "episode",
            EntityKind::User => "user",
            EntityKind::Comment => "comment",
        }
    }

    /// Human-readable name used in audit titles and error messages.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Movie => "Movie",
            EntityKind::Game => "Game",
            EntityKind::TvShow => "TV Show",
            EntityKind::Season => "Season",
            EntityKind::Episode => "Episode",
            EntityKind::User => "User",
            EntityKind::Comment => "Comment",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown entity type '{s}'")))
    }
}

/// Reference to one commentable media item, serialized as `{"kind": ..., "id": ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum MediaRef {
    Movie(DbId),
    Game(DbId),
    TvShow(DbId),
    Season(DbId),
    Episode(DbId),
}

impl MediaRef {
    pub fn id(self) -> DbId {
        match self {
            MediaRef::Movie(id)
            | MediaRef::Game(id)
            | MediaRef::TvShow(id)
            | MediaRef::Season(id)
            | MediaRef::Episode(id) => id,
        }
    }

    pub fn entity_kind(self) -> EntityKind {
        match self {
            MediaRef::Movie(_) => EntityKind::Movie,
            MediaRef::Game(_) => EntityKind::Game,
            MediaRef::TvShow(_) => EntityKind::TvShow,
            MediaRef::Season(_) => EntityKind::Season,
            MediaRef::Episode(_) => EntityKind::Episode,
        }
    }

    /// Rebuild a reference from its stored `(kind, id)` columns.
    ///
    /// Returns `None` for kinds that cannot carry comments.
    pub fn from_parts(kind: &str, id: DbId) -> Option<Self> {
        match kind.parse::<EntityKind>().ok()? {
            EntityKind::Movie => Some(MediaRef::Movie(id)),
            EntityKind::Game => Some(MediaRef::Game(id)),
            EntityKind::TvShow => Some(MediaRef::TvShow(id)),
            EntityKind::Season => Some(MediaRef::Season(id)),
            EntityKind::Episode => Some(MediaRef::Episode(id)),
            EntityKind::User | EntityKind::Comment => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Media status
// ---------------------------------------------------------------------------

/// Allowed values for the `status` column of movies, games and shows.
pub const MEDIA_STATUSES: &[&str] = &["released", "upcoming", "ongoing", "ended", "cancelled"];

/// Reject a status outside [`MEDIA_STATUSES`]. `None` is always accepted.
pub fn validate_status(status: Option<&str>) -> Result<(), CoreError> {
    match status {
        Some(s) if !MEDIA_STATUSES.contains(&s) => Err(CoreError::Validation(format!(
            "status: must be one of {}",
            MEDIA_STATUSES.join(", ")
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_kind_round_trips_through_storage_key() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_entity_kind_is_rejected() {
        assert!("TvShow".parse::<EntityKind>().is_err());
        assert!("".parse::<EntityKind>().is_err());
    }

    #[test]
    fn media_ref_serializes_as_kind_and_id() {
        let json = serde_json::to_value(MediaRef::TvShow(7)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "tvShow", "id": 7}));

        let parsed: MediaRef =
            serde_json::from_value(serde_json::json!({"kind": "episode", "id": 3})).unwrap();
        assert_eq!(parsed, MediaRef::Episode(3));
    }

    #[test]
    fn media_ref_from_parts_rejects_non_media_kinds() {
        assert_eq!(MediaRef::from_parts("movie", 1), Some(MediaRef::Movie(1)));
        assert_eq!(MediaRef::from_parts("user", 1), None);
        assert_eq!(MediaRef::from_parts("bogus", 1), None);
    }

    #[test]
    fn status_outside_fixed_set_fails() {
        assert!(validate_status(Some("released")).is_ok());
        assert!(validate_status(None).is_ok());
        assert!(validate_status(Some("Released")).is_err());
    }
}
