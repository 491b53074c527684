//! Compiles filter pipelines into one SQL statement per list request.
//!
//! The `Search` stage becomes the `WHERE` clause and `Paginate` becomes
//! `LIMIT`/`OFFSET`. The filtered total comes from `COUNT(*) OVER()` in the
//! same statement, so the page and its total are read together.

use reelhouse_core::filter::{FilterClause, FilterField, PipelineStage};
use reelhouse_core::pagination::{Page, PageRequest};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row};

/// Table a pipeline runs against.
#[derive(Debug, Clone, Copy)]
pub struct ListSource {
    pub table: &'static str,
    pub columns: &'static str,
}

/// Column name and whether it stores an array.
fn column(field: FilterField) -> (&'static str, bool) {
    match field {
        FilterField::Genres => ("genres", true),
        FilterField::Tags => ("tags", true),
        FilterField::Languages => ("languages", true),
        FilterField::Status => ("status", false),
        FilterField::Rating => ("rating", false),
        FilterField::ReleaseDate => ("release_date", false),
        FilterField::RunTime => ("run_time", false),
        FilterField::EpisodeCount => ("total_episodes", false),
        FilterField::SeasonCount => ("total_seasons", false),
        FilterField::Title => ("title", false),
    }
}

/// Escape `LIKE` metacharacters and wrap the query for a substring match.
pub fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Append `lo <= col AND col <= hi` for whichever bounds are present.
fn push_bounds<T>(qb: &mut QueryBuilder<'static, Postgres>, col: &str, min: Option<T>, max: Option<T>)
where
    T: 'static + Send + sqlx::Encode<'static, Postgres> + sqlx::Type<Postgres>,
{
    let mut first = true;
    if let Some(min) = min {
        qb.push(format!("{col} >= ")).push_bind(min);
        first = false;
    }
    if let Some(max) = max {
        if !first {
            qb.push(" AND ");
        }
        qb.push(format!("{col} <= ")).push_bind(max);
    } else if first {
        // Both bounds open: the clause matches everything.
        qb.push("TRUE");
    }
}

fn push_clause(qb: &mut QueryBuilder<'static, Postgres>, clause: &FilterClause) {
    let (col, is_array) = column(clause.field());
    qb.push("(");
    match clause {
        FilterClause::AnyOf { values, .. } if is_array => {
            qb.push(format!("{col} && ")).push_bind(values.clone());
        }
        FilterClause::AnyOf { values, .. } => {
            qb.push(format!("{col} = ANY(")).push_bind(values.clone()).push(")");
        }
        FilterClause::DecimalRange { min, max, .. } => push_bounds(qb, col, *min, *max),
        FilterClause::IntRange { min, max, .. } => push_bounds(qb, col, *min, *max),
        FilterClause::DateRange { from, to, .. } => push_bounds(qb, col, *from, *to),
        FilterClause::Text { query, .. } => {
            qb.push(format!("{col} ILIKE ")).push_bind(like_pattern(query));
        }
    }
    qb.push(")");
}

fn push_search(qb: &mut QueryBuilder<'static, Postgres>, stages: &[PipelineStage]) {
    let clauses = stages
        .iter()
        .filter_map(|stage| match stage {
            PipelineStage::Search(clauses) => Some(clauses),
            PipelineStage::Paginate(_) => None,
        })
        .flatten();
    let mut first = true;
    for clause in clauses {
        qb.push(if first { " WHERE " } else { " AND " });
        push_clause(qb, clause);
        first = false;
    }
}

fn page_of(stages: &[PipelineStage]) -> Option<PageRequest> {
    stages.iter().find_map(|stage| match stage {
        PipelineStage::Paginate(page) => Some(*page),
        PipelineStage::Search(_) => None,
    })
}

/// Build the page query: matching rows plus a `total_count` column.
pub fn compile(source: ListSource, stages: &[PipelineStage]) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {}, COUNT(*) OVER() AS total_count FROM {}",
        source.columns, source.table
    ));
    push_search(&mut qb, stages);
    qb.push(" ORDER BY created_at DESC, id DESC");
    if let Some(page) = page_of(stages) {
        qb.push(" LIMIT ").push_bind(page.limit);
        qb.push(" OFFSET ").push_bind(page.start);
    }
    qb
}

/// Build a count-only query for the same filters.
pub fn compile_count(source: ListSource, stages: &[PipelineStage]) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", source.table));
    push_search(&mut qb, stages);
    qb
}

/// Run a pipeline and return one page with its envelope.
pub async fn run<T>(
    pool: &PgPool,
    source: ListSource,
    stages: &[PipelineStage],
) -> Result<Page<T>, sqlx::Error>
where
    T: for<'r> FromRow<'r, PgRow>,
{
    let rows = compile(source, stages).build().fetch_all(pool).await?;

    let mut total = match rows.first() {
        Some(row) => row.try_get::<i64, _>("total_count")?,
        None => 0,
    };
    let items = rows
        .iter()
        .map(T::from_row)
        .collect::<Result<Vec<_>, _>>()?;

    let page = page_of(stages).unwrap_or(PageRequest {
        limit: items.len().max(1) as i64,
        start: 0,
    });

    // A page past the end has no rows to carry the window count.
    if items.is_empty() && page.start > 0 {
        total = compile_count(source, stages)
            .build_query_scalar::<i64>()
            .fetch_one(pool)
            .await?;
    }

    Ok(Page::new(items, total, page))
}
