//! Comment entity model and DTOs.
//!
//! A comment targets one media item through the `(target_kind, target_id)`
//! column pair, exposed on the wire as a `{kind, id}` reference.

use reelhouse_core::media::MediaRef;
use reelhouse_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use validator::Validate;

/// A comment row joined with its author's username.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: DbId,
    pub user_id: DbId,
    pub username: String,
    pub target: MediaRef,
    pub body: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl<'r> FromRow<'r, PgRow> for Comment {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let kind: String = row.try_get("target_kind")?;
        let target_id: DbId = row.try_get("target_id")?;
        let target =
            MediaRef::from_parts(&kind, target_id).ok_or_else(|| sqlx::Error::ColumnDecode {
                index: "target_kind".to_string(),
                source: format!("unknown comment target kind '{kind}'").into(),
            })?;

        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            username: row.try_get("username")?,
            target,
            body: row.try_get("body")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// DTO for posting a comment.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateComment {
    pub target: MediaRef,
    #[validate(length(min = 1, max = 2000, message = "must be 1-2000 characters"))]
    pub body: String,
}

/// DTO for editing a comment's text.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateComment {
    #[validate(length(min = 1, max = 2000, message = "must be 1-2000 characters"))]
    pub body: String,
}
