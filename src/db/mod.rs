//! # Database: PostgreSQL Storage Layer
//!
//! Async operations over the catalog tables via a shared `sqlx::PgPool`.
//!
//! ## Schema
//!
//! - `chapters`: title, description, sort_order, timestamps
//! - `problems`: chapter_id (RESTRICT on chapter delete), problem_number, title,
//!   description, difficulty, status, youtube_video_id, duration, timestamps
//!
//! `difficulty` and `problem_status` are Postgres enum types; see
//! `migrations/` for the DDL.
//!
//! ## Module Structure
//!
//! - [`chapters`]: Chapter CRUD and problem counts
//! - [`problems`]: Problem CRUD and filtered listing
//! - [`stats`]: Catalog-wide aggregates
//! - [`seeding`]: Transactional catalog import

mod chapters;
mod problems;
mod seeding;
mod stats;

pub use chapters::ChapterDeletion;
pub use seeding::SeedSummary;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use uuid::Uuid;

// ── Enumerations ────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "difficulty", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Exact, case-sensitive match against the wire spelling.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "EASY" => Some(Difficulty::Easy),
            "MEDIUM" => Some(Difficulty::Medium),
            "HARD" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }
}

/// Solution progress for a problem. Any status may move to any other.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "problem_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProblemStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

// ── Chapter types ───────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProblemCount {
    pub problems: i64,
}

/// A chapter as it appears in the chapter listing.
#[derive(Clone, Debug, Serialize)]
pub struct ChapterSummary {
    #[serde(flatten)]
    pub chapter: Chapter,
    #[serde(rename = "_count")]
    pub count: ProblemCount,
}

/// A chapter with its problems ordered by problem number.
#[derive(Clone, Debug, Serialize)]
pub struct ChapterDetail {
    #[serde(flatten)]
    pub chapter: Chapter,
    pub problems: Vec<Problem>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewChapter {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub order: i32,
}

/// Full replacement of a chapter's mutable fields. An absent description
/// clears the stored one.
#[derive(Clone, Debug, Deserialize)]
pub struct ChapterUpdate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub order: i32,
}

// ── Problem types ───────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub id: Uuid,
    pub chapter_id: Uuid,
    pub problem_number: i32,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub status: ProblemStatus,
    pub youtube_video_id: Option<String>,
    pub duration: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChapterRef {
    pub id: Uuid,
    pub title: String,
}

/// A problem in the filtered listing, carrying only its chapter's id and title.
#[derive(Clone, Debug, Serialize)]
pub struct ProblemListItem {
    #[serde(flatten)]
    pub problem: Problem,
    pub chapter: ChapterRef,
}

/// A single problem with its full parent chapter.
#[derive(Clone, Debug, Serialize)]
pub struct ProblemDetail {
    #[serde(flatten)]
    pub problem: Problem,
    pub chapter: Chapter,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProblem {
    pub chapter_id: Uuid,
    pub problem_number: i32,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub status: ProblemStatus,
    #[serde(default)]
    pub youtube_video_id: Option<String>,
    #[serde(default)]
    pub duration: Option<i32>,
}

/// Partial update of a problem. `None` leaves a field untouched; for the
/// nullable fields `Some(None)` clears the stored value.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<Difficulty>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub youtube_video_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub duration: Option<Option<i32>>,
    pub status: Option<ProblemStatus>,
}

/// Distinguishes an explicit `null` (`Some(None)`) from a missing key (`None`).
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ── Filters ─────────────────────────────────────────────────────

/// Raw `GET /problems` query string. Every value is kept as text so that
/// unknown difficulties can be ignored instead of rejected.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemQuery {
    pub chapter_id: Option<String>,
    pub search: Option<String>,
    pub difficulty: Option<String>,
}

/// Typed problem filter. Each present field adds one predicate; an absent
/// field never excludes anything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProblemFilter {
    pub chapter_id: Option<Uuid>,
    pub search: Option<String>,
    pub difficulty: Option<Difficulty>,
}

impl From<ProblemQuery> for ProblemFilter {
    fn from(query: ProblemQuery) -> Self {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        ProblemFilter {
            // A chapter id that is not a UUID names no chapter. The nil UUID is
            // never generated, so it keeps the exact-match semantics.
            chapter_id: non_empty(query.chapter_id)
                .map(|raw| Uuid::parse_str(&raw).unwrap_or(Uuid::nil())),
            search: non_empty(query.search),
            difficulty: query.difficulty.as_deref().and_then(Difficulty::parse),
        }
    }
}

/// Build an `ILIKE` pattern matching `needle` as a literal substring.
pub fn search_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

// ── Stats types ─────────────────────────────────────────────────

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct StatusCount {
    pub status: ProblemStatus,
    pub count: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct DifficultyCount {
    pub difficulty: Difficulty,
    pub count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub chapters: i64,
    pub problems: i64,
    pub by_status: Vec<StatusCount>,
    pub by_difficulty: Vec<DifficultyCount>,
    pub with_video: i64,
    pub video_seconds: i64,
}

// ── Database handle ─────────────────────────────────────────────

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL using the provided database URL.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let opts: PgConnectOptions = database_url.parse()?;
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await?;
        Ok(Database { pool })
    }

    /// Wrap an existing pool, e.g. one created with `connect_lazy`.
    pub fn from_pool(pool: PgPool) -> Self {
        Database { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the embedded migrations from `migrations/`.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Health check: execute `SELECT 1` to verify database connectivity.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────
