use super::model::StoredSummary;
use crate::model::Summary;
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;
use tracing::instrument;

pub type Pool = SqlitePool;

pub async fn init_pool(database_url: &str) -> Result<Pool> {
    let normalized = prepare_sqlite_url(database_url);
    // Applied to every connection the pool opens.
    let options = SqliteConnectOptions::from_str(&normalized)
        .with_context(|| format!("invalid database url: {}", normalized))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Full);
    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .context("failed to open summary database")?;
    Ok(pool)
}

/// If using a file-backed SQLite URL, expand a leading `~/` and ensure the parent
/// directory exists. Leaves in-memory and non-sqlite URLs untouched.
fn prepare_sqlite_url(url: &str) -> String {
    let Some(rest) = url.strip_prefix("sqlite:") else {
        return url.to_string();
    };
    if rest.starts_with(":memory") {
        return url.to_string();
    }

    let path_with_query = rest.strip_prefix("//").unwrap_or(rest);
    let (path_part, query_part) = match path_with_query.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path_with_query, None),
    };
    if path_part.is_empty() {
        return url.to_string();
    }

    let expanded_path = match (path_part.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => format!("{}/{}", home.trim_end_matches('/'), rest),
        _ => path_part.to_string(),
    };

    if let Some(parent) = std::path::Path::new(&expanded_path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }

    let mut rebuilt = format!("sqlite://{}", expanded_path);
    if let Some(q) = query_part {
        rebuilt.push('?');
        rebuilt.push_str(q);
    }
    rebuilt
}

pub async fn run_migrations(pool: &Pool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[instrument(skip(pool))]
pub async fn find_summary_by_podcast_id(pool: &Pool, podcast_id: &str) -> Result<Option<Summary>> {
    let summary = sqlx::query_as::<_, Summary>(
        "SELECT id, podcast_id, summary, created_at FROM summaries WHERE podcast_id = ?",
    )
    .bind(podcast_id)
    .fetch_optional(pool)
    .await
    .context("failed to query summaries")?;
    Ok(summary)
}

/// Insert a summary unless one already exists for `podcast_id`, then return
/// the stored row. An existing row is never overwritten.
#[instrument(skip(pool, text))]
pub async fn create_summary(pool: &Pool, podcast_id: &str, text: &str) -> Result<StoredSummary> {
    let id = uuid::Uuid::new_v4().to_string();
    let inserted = sqlx::query(
        "INSERT INTO summaries (id, podcast_id, summary, created_at) VALUES (?, ?, ?, ?) \
         ON CONFLICT(podcast_id) DO NOTHING",
    )
    .bind(&id)
    .bind(podcast_id)
    .bind(text)
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("failed to insert summary")?
    .rows_affected()
        == 1;

    let stored = find_summary_by_podcast_id(pool, podcast_id)
        .await?
        .ok_or_else(|| anyhow!("summary for {} missing after insert", podcast_id))?;

    if inserted {
        Ok(StoredSummary::Inserted(stored))
    } else {
        Ok(StoredSummary::Existing(stored))
    }
}

pub async fn count_summaries(pool: &Pool) -> Result<i64> {
    let cnt: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM summaries")
        .fetch_one(pool)
        .await?;
    Ok(cnt)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_pool() -> Pool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn find_missing_returns_none() {
        let pool = setup_pool().await;
        assert!(find_summary_by_podcast_id(&pool, "nope")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn create_then_find() {
        let pool = setup_pool().await;
        let created = match create_summary(&pool, "ep-1", "first line\nsecond line")
            .await
            .unwrap()
        {
            StoredSummary::Inserted(summary) => summary,
            other => panic!("expected a fresh insert, got {:?}", other),
        };
        assert_eq!(created.podcast_id, "ep-1");

        let found = find_summary_by_podcast_id(&pool, "ep-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.summary, "first line\nsecond line");
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn second_create_keeps_first_row() {
        let pool = setup_pool().await;
        let first = match create_summary(&pool, "ep-1", "original").await.unwrap() {
            StoredSummary::Inserted(summary) => summary,
            other => panic!("first write should insert, got {:?}", other),
        };
        let second = create_summary(&pool, "ep-1", "replacement").await.unwrap();

        assert_eq!(second, StoredSummary::Existing(first));
        assert_eq!(count_summaries(&pool).await.unwrap(), 1);
        let kept = find_summary_by_podcast_id(&pool, "ep-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.summary, "original");
    }

    #[tokio::test]
    async fn lookup_is_exact_match() {
        let pool = setup_pool().await;
        create_summary(&pool, "abc", "text").await.unwrap();
        assert!(find_summary_by_podcast_id(&pool, "ABC")
            .await
            .unwrap()
            .is_none());
        assert!(find_summary_by_podcast_id(&pool, "ab")
            .await
            .unwrap()
            .is_none());
    }

    #[test]
    fn prepare_sqlite_url_passthrough() {
        assert_eq!(prepare_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            prepare_sqlite_url("postgres://localhost/db"),
            "postgres://localhost/db"
        );
    }

    #[test]
    fn prepare_sqlite_url_creates_parent_dir() {
        let td = tempfile::tempdir().unwrap();
        let db_path = td.path().join("nested").join("summaries.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        let rebuilt = prepare_sqlite_url(&url);
        assert_eq!(rebuilt, url);
        assert!(td.path().join("nested").exists());
    }

    #[tokio::test]
    async fn every_pooled_connection_uses_wal_and_full_sync() {
        let td = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", td.path().join("pragmas.db").display());
        let pool = init_pool(&url).await.unwrap();

        let mut first = pool.acquire().await.unwrap();
        let mut second = pool.acquire().await.unwrap();
        for conn in [&mut first, &mut second] {
            let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
                .fetch_one(&mut **conn)
                .await
                .unwrap();
            assert_eq!(mode, "wal");
            let sync: i64 = sqlx::query_scalar("PRAGMA synchronous")
                .fetch_one(&mut **conn)
                .await
                .unwrap();
            assert_eq!(sync, 2);
        }
    }
}
