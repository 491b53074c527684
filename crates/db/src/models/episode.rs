//! Episode entity model and DTOs.

use chrono::NaiveDate;
use reelhouse_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// An episode row from the `episodes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: DbId,
    pub season_id: DbId,
    pub episode_number: i32,
    pub title: String,
    pub run_time: Option<i32>,
    pub air_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Episode fields, as nested inside a season payload.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEpisode {
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub episode_number: i32,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub run_time: Option<i32>,
    pub air_date: Option<NaiveDate>,
    #[validate(length(max = 5000, message = "must be at most 5000 characters"))]
    pub description: Option<String>,
}

/// An episode added on its own under an existing season.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewEpisode {
    pub season_id: DbId,
    #[serde(flatten)]
    #[validate(nested)]
    pub episode: CreateEpisode,
}

/// DTO for updating an episode. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEpisode {
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub episode_number: Option<i32>,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub run_time: Option<i32>,
    pub air_date: Option<NaiveDate>,
    #[validate(length(max = 5000, message = "must be at most 5000 characters"))]
    pub description: Option<String>,
}
