//! TV show entity, its nested create payload and the assembled tree.

use std::collections::HashMap;
use std::ops::AddAssign;

use chrono::NaiveDate;
use reelhouse_core::error::CoreError;
use reelhouse_core::media::validate_status;
use reelhouse_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::episode::Episode;
use crate::models::season::{CreateSeason, Season};

/// A show row from the `shows` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Show {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    pub status: Option<String>,
    pub rating: Option<f64>,
    pub release_date: Option<NaiveDate>,
    pub languages: Vec<String>,
    pub total_seasons: Option<i32>,
    pub total_episodes: Option<i32>,
    pub poster_path: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Payload for creating a show together with its seasons and episodes.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateShow {
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
    #[serde(default)]
    pub languages: Vec<String>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub total_seasons: Option<i32>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub total_episodes: Option<i32>,
    #[serde(default)]
    #[validate(nested)]
    pub seasons: Vec<CreateSeason>,
}

impl CreateShow {
    /// Field validation plus the status whitelist.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()?;
        validate_status(self.status.as_deref())
    }
}

/// DTO for updating a show's own fields. Seasons are not touched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShow {
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
    pub languages: Option<Vec<String>>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub total_seasons: Option<i32>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub total_episodes: Option<i32>,
}

impl UpdateShow {
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()?;
        validate_status(self.status.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Assembled trees
// ---------------------------------------------------------------------------

/// A season with its episodes, serialized as the season's fields plus
/// an `episodes` array.
#[derive(Debug, Clone, Serialize)]
pub struct SeasonTree {
    #[serde(flatten)]
    pub season: Season,
    pub episodes: Vec<Episode>,
}

/// A show with its seasons, each carrying its episodes.
#[derive(Debug, Clone, Serialize)]
pub struct ShowTree {
    #[serde(flatten)]
    pub show: Show,
    pub seasons: Vec<SeasonTree>,
}

/// Group children under their parent id, keeping input order.
fn group_by_parent<T>(items: Vec<T>, parent_of: impl Fn(&T) -> DbId) -> HashMap<DbId, Vec<T>> {
    let mut groups: HashMap<DbId, Vec<T>> = HashMap::new();
    for item in items {
        groups.entry(parent_of(&item)).or_default().push(item);
    }
    groups
}

impl SeasonTree {
    pub fn assemble(season: Season, episodes: Vec<Episode>) -> Self {
        let season_id = season.id;
        let episodes = episodes
            .into_iter()
            .filter(|e| e.season_id == season_id)
            .collect();
        Self { season, episodes }
    }
}

impl ShowTree {
    /// Rebuild one show tree from flat rows, joining children by foreign key.
    ///
    /// Rows belonging to other parents are ignored.
    pub fn assemble(show: Show, seasons: Vec<Season>, episodes: Vec<Episode>) -> Self {
        let seasons = seasons.into_iter().filter(|s| s.show_id == show.id).collect();
        let mut episodes_by_season = group_by_parent(episodes, |e| e.season_id);
        Self::attach(show, seasons, &mut episodes_by_season)
    }

    /// Rebuild several trees at once. Shows keep their input order, and so do
    /// the seasons and episodes within each parent.
    pub fn assemble_many(
        shows: Vec<Show>,
        seasons: Vec<Season>,
        episodes: Vec<Episode>,
    ) -> Vec<Self> {
        let mut seasons_by_show = group_by_parent(seasons, |s| s.show_id);
        let mut episodes_by_season = group_by_parent(episodes, |e| e.season_id);

        shows
            .into_iter()
            .map(|show| {
                let seasons = seasons_by_show.remove(&show.id).unwrap_or_default();
                Self::attach(show, seasons, &mut episodes_by_season)
            })
            .collect()
    }

    fn attach(
        show: Show,
        seasons: Vec<Season>,
        episodes_by_season: &mut HashMap<DbId, Vec<Episode>>,
    ) -> Self {
        let seasons = seasons
            .into_iter()
            .map(|season| {
                let episodes = episodes_by_season.remove(&season.id).unwrap_or_default();
                SeasonTree { season, episodes }
            })
            .collect();
        ShowTree { show, seasons }
    }

    pub fn episode_count(&self) -> usize {
        self.seasons.iter().map(|s| s.episodes.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Delete counts
// ---------------------------------------------------------------------------

/// Rows removed by a show tree delete, serialized as
/// `{tvShow, seasons, episodes}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowDeleteCounts {
    pub tv_show: u64,
    pub seasons: u64,
    pub episodes: u64,
}

impl AddAssign for ShowDeleteCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.tv_show += rhs.tv_show;
        self.seasons += rhs.seasons;
        self.episodes += rhs.episodes;
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn show(id: DbId) -> Show {
        Show {
            id,
            title: format!("Show {id}"),
            description: None,
            genres: vec![],
            tags: vec![],
            status: None,
            rating: None,
            release_date: None,
            languages: vec![],
            total_seasons: None,
            total_episodes: None,
            poster_path: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn season(id: DbId, show_id: DbId, number: i32) -> Season {
        Season {
            id,
            show_id,
            season_number: number,
            title: format!("S{number}"),
            episode_count: None,
            release_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn episode(id: DbId, season_id: DbId, number: i32) -> Episode {
        Episode {
            id,
            season_id,
            episode_number: number,
            title: format!("E{number}"),
            run_time: None,
            air_date: None,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn assemble_joins_children_by_foreign_key_in_order() {
        let tree = ShowTree::assemble(
            show(1),
            vec![season(10, 1, 1), season(11, 1, 2)],
            vec![episode(100, 10, 1), episode(101, 11, 1), episode(102, 10, 2)],
        );

        let titles: Vec<_> = tree.seasons.iter().map(|s| s.season.title.as_str()).collect();
        assert_eq!(titles, ["S1", "S2"]);
        let first: Vec<_> = tree.seasons[0].episodes.iter().map(|e| e.id).collect();
        assert_eq!(first, [100, 102]);
        assert_eq!(tree.seasons[1].episodes.len(), 1);
        assert_eq!(tree.episode_count(), 3);
    }

    #[test]
    fn assemble_many_keeps_trees_apart() {
        let trees = ShowTree::assemble_many(
            vec![show(1), show(2)],
            vec![season(10, 2, 1), season(11, 1, 1)],
            vec![episode(100, 10, 1)],
        );
        assert_eq!(trees[0].seasons[0].season.id, 11);
        assert!(trees[0].seasons[0].episodes.is_empty());
        assert_eq!(trees[1].seasons[0].episodes[0].id, 100);
    }

    #[test]
    fn tree_serializes_flat_show_fields_with_nested_arrays() {
        let tree = ShowTree::assemble(show(1), vec![season(10, 1, 1)], vec![episode(100, 10, 1)]);
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["seasons"][0]["showId"], 1);
        assert_eq!(json["seasons"][0]["episodes"][0]["seasonId"], 10);
    }

    #[test]
    fn delete_counts_accumulate_and_use_wire_names() {
        let mut total = ShowDeleteCounts::default();
        total += ShowDeleteCounts {
            tv_show: 1,
            seasons: 2,
            episodes: 3,
        };
        total += ShowDeleteCounts {
            tv_show: 1,
            seasons: 0,
            episodes: 0,
        };
        assert_eq!(
            serde_json::to_value(total).unwrap(),
            serde_json::json!({"tvShow": 2, "seasons": 2, "episodes": 3})
        );
    }
}
