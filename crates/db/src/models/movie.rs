//! Movie entity model and DTOs.

use chrono::NaiveDate;
use reelhouse_core::error::CoreError;
use reelhouse_core::media::validate_status;
use reelhouse_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A movie row from the `movies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    pub status: Option<String>,
    pub rating: Option<f64>,
    pub release_date: Option<NaiveDate>,
    /// Minutes.
    pub run_time: Option<i32>,
    pub languages: Vec<String>,
    pub poster_path: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a movie.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovie {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,
    #[validate(length(max = 5000, message = "must be at most 5000 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: Option<String>,
    #[validate(range(min = 0.0, max = 10.0, message = "must be between 0 and 10"))]
    pub rating: Option<f64>,
    pub release_date: Option<NaiveDate>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub run_time: Option<i32>,
    #[serde(default)]
    pub languages: Vec<String>,
}

impl CreateMovie {
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()?;
        validate_status(self.status.as_deref())
    }
}

/// DTO for updating a movie. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMovie {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 5000, message = "must be at most 5000 characters"))]
    pub description: Option<String>,
    pub genres: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub status: Option<String>,
    #[validate(range(min = 0.0, max = 10.0, message = "must be between 0 and 10"))]
    pub rating: Option<f64>,
    pub release_date: Option<NaiveDate>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub run_time: Option<i32>,
    pub languages: Option<Vec<String>>,
}

impl UpdateMovie {
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()?;
        validate_status(self.status.as_deref())
    }
}
