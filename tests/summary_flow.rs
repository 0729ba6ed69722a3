use anyhow::{anyhow, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use podcast_summarizer::db;
use podcast_summarizer::gemini::SummaryGenerator;
use podcast_summarizer::listennotes::EpisodeSource;
use podcast_summarizer::model::{Episode, PodcastRef, SearchPage};
use podcast_summarizer::summary::{SummaryError, SummaryOutcome, SummaryService};

async fn setup_pool() -> sqlx::SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::run_migrations(&pool).await.unwrap();
    pool
}

fn episode(id: &str) -> Episode {
    Episode {
        id: id.to_string(),
        title: format!("Episode {}", id),
        title_original: format!("Episode {}", id),
        description: "Two hosts discuss compilers.".into(),
        podcast: PodcastRef {
            id: "pod".into(),
            title: "Show".into(),
            publisher: "Publisher".into(),
        },
        ..Default::default()
    }
}

#[derive(Clone, Default)]
struct RecordingEpisodes {
    known: Arc<HashMap<String, Episode>>,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl RecordingEpisodes {
    fn with_episodes(ids: &[&str]) -> Self {
        let known = ids.iter().map(|id| (id.to_string(), episode(id))).collect();
        Self {
            known: Arc::new(known),
            ..Default::default()
        }
    }

    async fn lookups(&self) -> Vec<String> {
        self.lookups.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl EpisodeSource for RecordingEpisodes {
    async fn search(&self, _query: Option<&str>, _limit: u32, _page: u32) -> Result<SearchPage> {
        Ok(SearchPage::default())
    }

    async fn get_episode(&self, id: &str) -> Result<Episode> {
        self.lookups.lock().await.push(id.to_string());
        self.known
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("listen notes error 404 Not Found"))
    }
}

#[derive(Clone, Default)]
struct RecordingGenerator {
    responses: Arc<Mutex<VecDeque<Result<String>>>>,
    calls: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl RecordingGenerator {
    fn with_responses(responses: Vec<Result<String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            ..Default::default()
        }
    }

    async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl SummaryGenerator for RecordingGenerator {
    async fn generate(&self, episode: &Episode) -> Result<String> {
        self.calls.lock().await.push(episode.id.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut guard = self.responses.lock().await;
        guard
            .pop_front()
            .unwrap_or_else(|| Ok(format!("Summary of {}", episode.id)))
    }
}

fn service(
    pool: &sqlx::SqlitePool,
    episodes: &RecordingEpisodes,
    generator: &RecordingGenerator,
) -> SummaryService {
    SummaryService::new(
        pool.clone(),
        Arc::new(episodes.clone()),
        Arc::new(generator.clone()),
    )
}

#[tokio::test]
async fn miss_generates_once_and_persists() {
    let pool = setup_pool().await;
    let episodes = RecordingEpisodes::with_episodes(&["abc123"]);
    let generator =
        RecordingGenerator::with_responses(vec![Ok("Topics.\n\nKey points.".into())]);
    let svc = service(&pool, &episodes, &generator);

    let outcome = svc.retrieve_or_create("abc123").await.unwrap();
    assert!(outcome.is_created());
    let summary = outcome.into_summary();
    assert_eq!(summary.podcast_id, "abc123");
    assert_eq!(summary.summary, "Topics.\n\nKey points.");

    assert_eq!(generator.calls().await, vec!["abc123".to_string()]);
    assert_eq!(episodes.lookups().await, vec!["abc123".to_string()]);
    assert_eq!(db::count_summaries(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn hit_skips_both_upstreams() {
    let pool = setup_pool().await;
    let episodes = RecordingEpisodes::with_episodes(&["abc123"]);
    let generator = RecordingGenerator::default();
    let svc = service(&pool, &episodes, &generator);

    let first = svc.retrieve_or_create("abc123").await.unwrap();
    let second = svc.retrieve_or_create("abc123").await.unwrap();
    assert!(matches!(second, SummaryOutcome::Cached(_)));
    let first = first.into_summary();
    assert_eq!(second.into_summary(), first);

    let retrieved = svc.retrieve("abc123").await.unwrap().unwrap();
    assert_eq!(retrieved, first);

    assert_eq!(generator.calls().await.len(), 1);
    assert_eq!(episodes.lookups().await.len(), 1);
}

#[tokio::test]
async fn retrieve_never_generates() {
    let pool = setup_pool().await;
    let episodes = RecordingEpisodes::with_episodes(&["abc123"]);
    let generator = RecordingGenerator::default();
    let svc = service(&pool, &episodes, &generator);

    assert!(svc.retrieve("abc123").await.unwrap().is_none());
    assert!(generator.calls().await.is_empty());
    assert!(episodes.lookups().await.is_empty());
    assert_eq!(db::count_summaries(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn unknown_episode_fails_before_generation() {
    let pool = setup_pool().await;
    let episodes = RecordingEpisodes::with_episodes(&[]);
    let generator = RecordingGenerator::default();
    let svc = service(&pool, &episodes, &generator);

    let err = svc.retrieve_or_create("missing").await.unwrap_err();
    assert!(matches!(err, SummaryError::Episode(_)));
    assert!(generator.calls().await.is_empty());
    assert_eq!(db::count_summaries(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn generation_failure_persists_nothing() {
    let pool = setup_pool().await;
    let episodes = RecordingEpisodes::with_episodes(&["abc123"]);
    let generator =
        RecordingGenerator::with_responses(vec![Err(anyhow!("prompt blocked: SAFETY"))]);
    let svc = service(&pool, &episodes, &generator);

    let err = svc.retrieve_or_create("abc123").await.unwrap_err();
    assert!(matches!(err, SummaryError::Generation(_)));
    assert!(err.to_string().contains("SAFETY"));
    assert_eq!(db::count_summaries(&pool).await.unwrap(), 0);

    // A later attempt can still succeed.
    let outcome = svc.retrieve_or_create("abc123").await.unwrap();
    assert!(outcome.is_created());
    assert_eq!(generator.calls().await.len(), 2);
}

#[tokio::test]
async fn concurrent_misses_store_a_single_summary() {
    let pool = setup_pool().await;
    let episodes = RecordingEpisodes::with_episodes(&["race"]);
    let generator = RecordingGenerator {
        delay: Some(Duration::from_millis(20)),
        ..RecordingGenerator::with_responses(vec![Ok("first".into()), Ok("second".into())])
    };
    let svc = service(&pool, &episodes, &generator);

    let (a, b) = tokio::join!(svc.retrieve_or_create("race"), svc.retrieve_or_create("race"));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(db::count_summaries(&pool).await.unwrap(), 1);
    assert_eq!(
        [a.is_created(), b.is_created()]
            .iter()
            .filter(|created| **created)
            .count(),
        1
    );
    assert_eq!(a.into_summary(), b.into_summary());
    assert_eq!(generator.calls().await.len(), 2);
}
