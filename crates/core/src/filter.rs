//! Filter pipeline for media list endpoints.
//!
//! Query parameters are validated into a [`MediaFilter`], which
//! [`build_filter_pipeline`] turns into an ordered list of [`PipelineStage`]s.
//! The database layer compiles those stages into a single SQL statement.

use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::error::CoreError;
use crate::media::MEDIA_STATUSES;
use crate::pagination::PageRequest;

// ---------------------------------------------------------------------------
// Listed collections
// ---------------------------------------------------------------------------

/// Media collections that expose a filtered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCollection {
    Movies,
    Games,
    Shows,
}

impl MediaCollection {
    /// Whether the collection stores the column behind `field`.
    pub fn supports(self, field: FilterField) -> bool {
        match field {
            FilterField::RunTime => self == MediaCollection::Movies,
            FilterField::EpisodeCount | FilterField::SeasonCount => self == MediaCollection::Shows,
            _ => true,
        }
    }

    fn label(self) -> &'static str {
        match self {
            MediaCollection::Movies => "movies",
            MediaCollection::Games => "games",
            MediaCollection::Shows => "tv shows",
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline types
// ---------------------------------------------------------------------------

/// A filterable attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Genres,
    Tags,
    Status,
    Rating,
    ReleaseDate,
    RunTime,
    EpisodeCount,
    SeasonCount,
    Languages,
    Title,
}

/// One condition inside the search stage.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterClause {
    /// The field holds at least one of `values`.
    AnyOf {
        field: FilterField,
        values: Vec<String>,
    },
    /// Inclusive decimal range; either bound may be open.
    DecimalRange {
        field: FilterField,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// Inclusive integer range; either bound may be open.
    IntRange {
        field: FilterField,
        min: Option<i32>,
        max: Option<i32>,
    },
    /// Inclusive date range; either bound may be open.
    DateRange {
        field: FilterField,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
    /// Case-insensitive substring match.
    Text { field: FilterField, query: String },
}

impl FilterClause {
    pub fn field(&self) -> FilterField {
        match self {
            FilterClause::AnyOf { field, .. }
            | FilterClause::DecimalRange { field, .. }
            | FilterClause::IntRange { field, .. }
            | FilterClause::DateRange { field, .. }
            | FilterClause::Text { field, .. } => *field,
        }
    }
}

/// A stage of the list query, applied in order.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineStage {
    /// All clauses must hold.
    Search(Vec<FilterClause>),
    /// Page of results plus the total matching count.
    Paginate(PageRequest),
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Filter parameters as they arrive in the query string.
///
/// List-valued fields are comma separated (`genres=Drama,Crime`).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MediaFilterParams {
    pub genres: Option<String>,
    pub tags: Option<String>,
    pub status: Option<String>,
    #[validate(range(min = 0.0, max = 10.0, message = "must be between 0 and 10"))]
    pub min_rating: Option<f64>,
    #[validate(range(min = 0.0, max = 10.0, message = "must be between 0 and 10"))]
    pub max_rating: Option<f64>,
    pub released_after: Option<NaiveDate>,
    pub released_before: Option<NaiveDate>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub min_run_time: Option<i32>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub max_run_time: Option<i32>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub min_episodes: Option<i32>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub max_episodes: Option<i32>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub min_seasons: Option<i32>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub max_seasons: Option<i32>,
    pub languages: Option<String>,
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    pub q: Option<String>,
}

/// Validated filter input for [`build_filter_pipeline`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaFilter {
    pub genres: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub status: Option<Vec<String>>,
    pub rating: Option<(Option<f64>, Option<f64>)>,
    pub release_date: Option<(Option<NaiveDate>, Option<NaiveDate>)>,
    pub run_time: Option<(Option<i32>, Option<i32>)>,
    pub episode_count: Option<(Option<i32>, Option<i32>)>,
    pub season_count: Option<(Option<i32>, Option<i32>)>,
    pub languages: Option<Vec<String>>,
    pub title: Option<String>,
}

/// Split a comma-separated list, dropping blanks. Empty lists become `None`.
fn split_list(raw: &Option<String>) -> Option<Vec<String>> {
    let values: Vec<String> = raw
        .as_deref()?
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

/// Pair two optional bounds, rejecting `min > max`.
fn range<T: PartialOrd + Copy>(
    name: &str,
    min: Option<T>,
    max: Option<T>,
) -> Result<Option<(Option<T>, Option<T>)>, CoreError> {
    match (min, max) {
        (None, None) => Ok(None),
        (Some(lo), Some(hi)) if lo > hi => Err(CoreError::Validation(format!(
            "{name}: minimum must not exceed maximum"
        ))),
        bounds => Ok(Some(bounds)),
    }
}

impl MediaFilterParams {
    /// Validate the parameters for one collection.
    ///
    /// Rejects out-of-range values, inverted ranges, unknown statuses, and
    /// fields the collection does not store.
    pub fn validate_for(&self, collection: MediaCollection) -> Result<MediaFilter, CoreError> {
        self.validate()?;

        let status = split_list(&self.status);
        if let Some(statuses) = &status {
            if let Some(bad) = statuses.iter().find(|s| !MEDIA_STATUSES.contains(&s.as_str())) {
                return Err(CoreError::Validation(format!(
                    "status: unknown value '{bad}'"
                )));
            }
        }

        let filter = MediaFilter {
            genres: split_list(&self.genres),
            tags: split_list(&self.tags),
            status,
            rating: range("rating", self.min_rating, self.max_rating)?,
            release_date: range("releaseDate", self.released_after, self.released_before)?,
            run_time: range("runTime", self.min_run_time, self.max_run_time)?,
            episode_count: range("episodes", self.min_episodes, self.max_episodes)?,
            season_count: range("seasons", self.min_seasons, self.max_seasons)?,
            languages: split_list(&self.languages),
            title: self
                .q
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
        };

        let unsupported = [
            (FilterField::RunTime, filter.run_time.is_some(), "runTime"),
            (FilterField::EpisodeCount, filter.episode_count.is_some(), "episodes"),
            (FilterField::SeasonCount, filter.season_count.is_some(), "seasons"),
        ]
        .into_iter()
        .find(|(field, present, _)| *present && !collection.supports(*field));

        if let Some((_, _, name)) = unsupported {
            return Err(CoreError::Validation(format!(
                "{name}: filter is not available for {}",
                collection.label()
            )));
        }

        Ok(filter)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Translate a validated filter into pipeline stages.
///
/// Clauses are appended in a fixed order: genres, tags, status, rating,
/// release date, run time, episode count, season count, languages, title.
/// When any clause exists they are wrapped in one `Search` stage. A
/// `Paginate` stage always comes last.
pub fn build_filter_pipeline(filter: &MediaFilter, page: PageRequest) -> Vec<PipelineStage> {
    let mut clauses = Vec::new();

    let memberships = [
        (FilterField::Genres, &filter.genres),
        (FilterField::Tags, &filter.tags),
        (FilterField::Status, &filter.status),
    ];
    for (field, values) in memberships {
        if let Some(values) = values {
            clauses.push(FilterClause::AnyOf {
                field,
                values: values.clone(),
            });
        }
    }

    if let Some((min, max)) = filter.rating {
        clauses.push(FilterClause::DecimalRange {
            field: FilterField::Rating,
            min,
            max,
        });
    }

    if let Some((from, to)) = filter.release_date {
        clauses.push(FilterClause::DateRange {
            field: FilterField::ReleaseDate,
            from,
            to,
        });
    }

    let int_ranges = [
        (FilterField::RunTime, filter.run_time),
        (FilterField::EpisodeCount, filter.episode_count),
        (FilterField::SeasonCount, filter.season_count),
    ];
    for (field, bounds) in int_ranges {
        if let Some((min, max)) = bounds {
            clauses.push(FilterClause::IntRange { field, min, max });
        }
    }

    if let Some(languages) = &filter.languages {
        clauses.push(FilterClause::AnyOf {
            field: FilterField::Languages,
            values: languages.clone(),
        });
    }

    if let Some(title) = &filter.title {
        clauses.push(FilterClause::Text {
            field: FilterField::Title,
            query: title.clone(),
        });
    }

    let mut stages = Vec::with_capacity(2);
    if !clauses.is_empty() {
        stages.push(PipelineStage::Search(clauses));
    }
    stages.push(PipelineStage::Paginate(page));
    stages
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const PAGE: PageRequest = PageRequest {
        limit: 20,
        start: 0,
    };

    fn fields(stages: &[PipelineStage]) -> Vec<FilterField> {
        match &stages[0] {
            PipelineStage::Search(clauses) => clauses.iter().map(FilterClause::field).collect(),
            other => panic!("expected search stage, got {other:?}"),
        }
    }

    #[test]
    fn no_filters_yields_only_pagination() {
        let stages = build_filter_pipeline(&MediaFilter::default(), PAGE);
        assert_eq!(stages, vec![PipelineStage::Paginate(PAGE)]);
    }

    #[test]
    fn clauses_follow_fixed_order_regardless_of_input() {
        let filter = MediaFilter {
            languages: Some(vec!["en".into()]),
            season_count: Some((Some(1), None)),
            rating: Some((Some(7.0), None)),
            status: Some(vec!["ended".into()]),
            genres: Some(vec!["Drama".into()]),
            title: Some("wire".into()),
            release_date: Some((None, NaiveDate::from_ymd_opt(2010, 1, 1))),
            tags: Some(vec!["hbo".into()]),
            episode_count: Some((None, Some(80))),
            run_time: None,
        };

        let stages = build_filter_pipeline(&filter, PAGE);
        assert_eq!(stages.len(), 2);
        assert_eq!(
            fields(&stages),
            vec![
                FilterField::Genres,
                FilterField::Tags,
                FilterField::Status,
                FilterField::Rating,
                FilterField::ReleaseDate,
                FilterField::EpisodeCount,
                FilterField::SeasonCount,
                FilterField::Languages,
                FilterField::Title,
            ]
        );
        assert_eq!(stages[1], PipelineStage::Paginate(PAGE));
    }

    #[test]
    fn each_present_field_adds_exactly_one_clause() {
        let filter = MediaFilter {
            genres: Some(vec!["Drama".into(), "Crime".into()]),
            ..Default::default()
        };
        let stages = build_filter_pipeline(&filter, PAGE);
        assert_matches!(&stages[0], PipelineStage::Search(clauses) if clauses.len() == 1);
    }

    #[test]
    fn params_split_comma_lists_and_drop_blanks() {
        let params = MediaFilterParams {
            genres: Some("Drama, Crime,,".into()),
            languages: Some(" , ".into()),
            ..Default::default()
        };
        let filter = params.validate_for(MediaCollection::Movies).unwrap();
        assert_eq!(filter.genres, Some(vec!["Drama".to_string(), "Crime".to_string()]));
        assert_eq!(filter.languages, None);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let params = MediaFilterParams {
            min_rating: Some(8.0),
            max_rating: Some(3.0),
            ..Default::default()
        };
        assert_matches!(
            params.validate_for(MediaCollection::Games),
            Err(CoreError::Validation(msg)) if msg.contains("rating")
        );
    }

    #[test]
    fn rating_out_of_bounds_is_rejected() {
        let params = MediaFilterParams {
            max_rating: Some(11.0),
            ..Default::default()
        };
        assert_matches!(
            params.validate_for(MediaCollection::Movies),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn unknown_status_is_rejected() {
        let params = MediaFilterParams {
            status: Some("released,archived".into()),
            ..Default::default()
        };
        assert_matches!(
            params.validate_for(MediaCollection::Shows),
            Err(CoreError::Validation(msg)) if msg.contains("archived")
        );
    }

    #[test]
    fn season_filter_only_applies_to_shows() {
        let params = MediaFilterParams {
            min_seasons: Some(2),
            ..Default::default()
        };
        assert!(params.validate_for(MediaCollection::Shows).is_ok());
        assert_matches!(
            params.validate_for(MediaCollection::Movies),
            Err(CoreError::Validation(msg)) if msg.contains("seasons")
        );
    }

    #[test]
    fn run_time_filter_only_applies_to_movies() {
        let params = MediaFilterParams {
            max_run_time: Some(120),
            ..Default::default()
        };
        assert!(params.validate_for(MediaCollection::Movies).is_ok());
        assert!(params.validate_for(MediaCollection::Games).is_err());
    }

    #[test]
    fn blank_text_query_is_ignored() {
        let params = MediaFilterParams {
            q: Some("   ".into()),
            ..Default::default()
        };
        let filter = params.validate_for(MediaCollection::Movies).unwrap();
        assert_eq!(filter.title, None);
    }
}
