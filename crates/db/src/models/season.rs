//! Season entity model and DTOs.

use std::ops::AddAssign;

use chrono::NaiveDate;
use reelhouse_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::episode::CreateEpisode;

/// A season row from the `seasons` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub id: DbId,
    pub show_id: DbId,
    pub season_number: i32,
    pub title: String,
    pub episode_count: Option<i32>,
    pub release_date: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A season with its episodes, as nested inside a show payload.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSeason {
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub season_number: i32,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub episode_count: Option<i32>,
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(nested)]
    pub episodes: Vec<CreateEpisode>,
}

/// A season added on its own under an existing show.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSeason {
    pub show_id: DbId,
    #[serde(flatten)]
    #[validate(nested)]
    pub season: CreateSeason,
}

/// DTO for updating a season. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSeason {
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub season_number: Option<i32>,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub episode_count: Option<i32>,
    pub release_date: Option<NaiveDate>,
}

/// Rows removed by a season tree delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeasonDeleteCounts {
    pub seasons: u64,
    pub episodes: u64,
}

impl AddAssign for SeasonDeleteCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.seasons += rhs.seasons;
        self.episodes += rhs.episodes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_season_reads_show_id_beside_season_fields() {
        let input: NewSeason = serde_json::from_value(serde_json::json!({
            "showId": 4,
            "seasonNumber": 2,
            "title": "Season Two",
            "episodes": [{"episodeNumber": 1, "title": "Return"}]
        }))
        .unwrap();
        assert_eq!(input.show_id, 4);
        assert_eq!(input.season.season_number, 2);
        assert_eq!(input.season.episodes.len(), 1);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn nested_episode_errors_surface() {
        let input: CreateSeason = serde_json::from_value(serde_json::json!({
            "seasonNumber": 1,
            "title": "S1",
            "episodes": [{"episodeNumber": 1, "title": ""}]
        }))
        .unwrap();
        assert!(input.validate().is_err());
    }
}
