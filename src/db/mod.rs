pub mod queries;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Error;

pub use queries::categories::Category;
pub use queries::questions::Question;

pub const QUESTIONS_PER_PAGE: i64 = 10;

/// 1-based page of an ordered result set, `QUESTIONS_PER_PAGE` rows wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page(i64);

impl Page {
    /// Numbers below 1 are clamped to the first page.
    pub fn new(number: i64) -> Self {
        Page(number.max(1))
    }

    pub fn number(&self) -> i64 {
        self.0
    }

    pub fn limit(&self) -> i64 {
        QUESTIONS_PER_PAGE
    }

    pub fn offset(&self) -> i64 {
        (self.0 - 1).saturating_mul(QUESTIONS_PER_PAGE)
    }

    /// This page's rows out of an already ordered, in-memory selection.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit()).unwrap_or(usize::MAX);
        items.into_iter().skip(offset).take(limit).collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Page(1)
    }
}

pub async fn establish_connection(url: &str) -> Result<SqlitePool, Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let mut pool = SqlitePoolOptions::new();
    // every in-memory connection is its own database
    if url.contains(":memory:") {
        pool = pool
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>);
    }
    pool.connect_with(options).await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = establish_connection("sqlite::memory:")
        .await
        .expect("in-memory database");
    run_migrations(&pool).await.expect("migrations");
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_starts_at_zero() {
        let page = Page::default();
        assert_eq!(page.number(), 1);
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), 10);
    }

    #[test]
    fn later_pages_skip_whole_pages() {
        assert_eq!(Page::new(2).offset(), 10);
        assert_eq!(Page::new(7).offset(), 60);
    }

    #[test]
    fn non_positive_pages_are_clamped() {
        assert_eq!(Page::new(0), Page::default());
        assert_eq!(Page::new(-4).offset(), 0);
    }

    #[test]
    fn slice_takes_one_page_of_rows() {
        let rows: Vec<i64> = (1..=23).collect();
        assert_eq!(Page::default().slice(rows.clone()), (1..=10).collect::<Vec<_>>());
        assert_eq!(Page::new(3).slice(rows.clone()), [21, 22, 23]);
        assert!(Page::new(4).slice(rows.clone()).is_empty());
        assert!(Page::new(i64::MAX).slice(rows).is_empty());
    }

    #[test]
    fn huge_page_does_not_overflow() {
        assert_eq!(Page::new(i64::MAX).offset(), i64::MAX);
    }

    #[tokio::test]
    async fn migrations_seed_standard_categories() {
        let pool = test_pool().await;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 6);
    }
}
