//! Integration tests for filtered media lists.
//!
//! Runs compiled filter pipelines against real rows and checks both the
//! page contents and the pagination envelope.

use chrono::NaiveDate;
use reelhouse_core::filter::{build_filter_pipeline, MediaCollection, MediaFilterParams};
use reelhouse_core::pagination::PageRequest;
use reelhouse_db::models::movie::CreateMovie;
use reelhouse_db::repositories::MovieRepo;
use sqlx::PgPool;

fn movie(title: &str, genres: &[&str], rating: f64, year: i32) -> CreateMovie {
    CreateMovie {
        title: title.to_string(),
        description: None,
        genres: genres.iter().map(|g| g.to_string()).collect(),
        tags: vec![],
        status: Some("released".into()),
        rating: Some(rating),
        release_date: NaiveDate::from_ymd_opt(year, 6, 1),
        run_time: Some(120),
        languages: vec!["en".into()],
    }
}

async fn seed(pool: &PgPool) {
    for input in [
        movie("Heat", &["Crime", "Drama"], 8.3, 1995),
        movie("Alien", &["Horror", "Sci-Fi"], 8.5, 1979),
        movie("Ronin", &["Crime", "Action"], 7.2, 1998),
        movie("Solaris", &["Sci-Fi", "Drama"], 8.0, 1972),
        movie("100% Pure", &["Comedy"], 5.0, 2001),
    ] {
        MovieRepo::insert(pool, &input).await.unwrap();
    }
}

fn stages(params: MediaFilterParams, page: PageRequest) -> Vec<reelhouse_core::filter::PipelineStage> {
    let filter = params.validate_for(MediaCollection::Movies).unwrap();
    build_filter_pipeline(&filter, page)
}

const FIRST_PAGE: PageRequest = PageRequest { limit: 20, start: 0 };

#[sqlx::test(migrations = "./migrations")]
async fn test_genre_and_rating_filters_combine(pool: PgPool) {
    seed(&pool).await;

    let params = MediaFilterParams {
        genres: Some("Crime,Sci-Fi".into()),
        min_rating: Some(8.0),
        ..Default::default()
    };
    let page = MovieRepo::list(&pool, &stages(params, FIRST_PAGE)).await.unwrap();

    let mut titles: Vec<_> = page.items.iter().map(|m| m.title.as_str()).collect();
    titles.sort();
    assert_eq!(titles, ["Alien", "Heat", "Solaris"]);
    assert_eq!(page.pagination.total, 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_total_reflects_filter_not_page(pool: PgPool) {
    seed(&pool).await;

    let page = MovieRepo::list(
        &pool,
        &stages(MediaFilterParams::default(), PageRequest { limit: 2, start: 2 }),
    )
    .await
    .unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.pagination.total, 5);
    assert_eq!(page.pagination.current_page, 2);
    assert_eq!(page.pagination.total_pages, 3);
    assert!(page.pagination.has_more);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_page_past_the_end_still_reports_total(pool: PgPool) {
    seed(&pool).await;

    let page = MovieRepo::list(
        &pool,
        &stages(MediaFilterParams::default(), PageRequest { limit: 10, start: 40 }),
    )
    .await
    .unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.pagination.total, 5);
    assert!(!page.pagination.has_more);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_release_window_and_title_search(pool: PgPool) {
    seed(&pool).await;

    let params = MediaFilterParams {
        released_after: NaiveDate::from_ymd_opt(1990, 1, 1),
        q: Some("ro".into()),
        ..Default::default()
    };
    let page = MovieRepo::list(&pool, &stages(params, FIRST_PAGE)).await.unwrap();

    let titles: Vec<_> = page.items.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, ["Ronin"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_title_search_treats_percent_literally(pool: PgPool) {
    seed(&pool).await;

    let params = MediaFilterParams {
        q: Some("100%".into()),
        ..Default::default()
    };
    let page = MovieRepo::list(&pool, &stages(params, FIRST_PAGE)).await.unwrap();

    assert_eq!(page.pagination.total, 1);
    assert_eq!(page.items[0].title, "100% Pure");
}
