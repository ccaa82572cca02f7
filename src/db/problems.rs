//! Problem CRUD operations and filtered listing.
//!
//! Listing builds its WHERE clause from whichever [`ProblemFilter`] fields are
//! set; partial updates build their SET clause the same way from the present
//! [`ProblemUpdate`] fields. Values are always bound, never interpolated.

use super::{
    search_pattern, Chapter, ChapterRef, Database, NewProblem, Problem, ProblemDetail,
    ProblemFilter, ProblemListItem, ProblemUpdate,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

const PROBLEM_COLUMNS: &str = "p.id, p.chapter_id, p.problem_number, p.title, p.description, \
     p.difficulty, p.status, p.youtube_video_id, p.duration, p.created_at, p.updated_at";

const CHAPTER_COLUMNS: &str = "c.title AS chapter_title, c.description AS chapter_description, \
     c.sort_order AS chapter_sort_order, c.created_at AS chapter_created_at, \
     c.updated_at AS chapter_updated_at";

#[derive(sqlx::FromRow)]
struct ProblemTitleRow {
    #[sqlx(flatten)]
    problem: Problem,
    chapter_title: String,
}

impl From<ProblemTitleRow> for ProblemListItem {
    fn from(row: ProblemTitleRow) -> Self {
        ProblemListItem {
            chapter: ChapterRef {
                id: row.problem.chapter_id,
                title: row.chapter_title,
            },
            problem: row.problem,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProblemChapterRow {
    #[sqlx(flatten)]
    problem: Problem,
    chapter_title: String,
    chapter_description: Option<String>,
    chapter_sort_order: i32,
    chapter_created_at: DateTime<Utc>,
    chapter_updated_at: DateTime<Utc>,
}

impl From<ProblemChapterRow> for ProblemDetail {
    fn from(row: ProblemChapterRow) -> Self {
        ProblemDetail {
            chapter: Chapter {
                id: row.problem.chapter_id,
                title: row.chapter_title,
                description: row.chapter_description,
                order: row.chapter_sort_order,
                created_at: row.chapter_created_at,
                updated_at: row.chapter_updated_at,
            },
            problem: row.problem,
        }
    }
}

impl ProblemFilter {
    /// SQL predicates for the set fields, numbered from `$1` in field order
    /// (chapter, search, difficulty).
    pub(crate) fn conditions(&self) -> Vec<String> {
        let mut conditions = Vec::new();
        let mut param_idx = 1u32;

        if self.chapter_id.is_some() {
            conditions.push(format!("p.chapter_id = ${}", param_idx));
            param_idx += 1;
        }
        if self.search.is_some() {
            conditions.push(format!(
                "(p.title ILIKE ${0} OR p.description ILIKE ${0})",
                param_idx
            ));
            param_idx += 1;
        }
        if self.difficulty.is_some() {
            conditions.push(format!("p.difficulty = ${}", param_idx));
        }
        conditions
    }
}

impl ProblemUpdate {
    /// SET assignments for the present fields, numbered from `$2` (`$1` is
    /// the problem id). Always touches `updated_at`, so the list is never empty.
    pub(crate) fn assignments(&self) -> Vec<String> {
        let mut assignments = Vec::new();
        let mut param_idx = 2u32;
        let mut assign = |column: &str, present: bool| {
            if present {
                assignments.push(format!("{} = ${}", column, param_idx));
                param_idx += 1;
            }
        };

        assign("title", self.title.is_some());
        assign("description", self.description.is_some());
        assign("difficulty", self.difficulty.is_some());
        assign("youtube_video_id", self.youtube_video_id.is_some());
        assign("duration", self.duration.is_some());
        assign("status", self.status.is_some());

        assignments.push("updated_at = NOW()".to_string());
        assignments
    }
}

impl Database {
    /// Problems matching `filter`, ordered by chapter id then problem number.
    pub async fn list_problems(&self, filter: &ProblemFilter) -> Result<Vec<ProblemListItem>> {
        let conditions = filter.conditions();
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT {}, c.title AS chapter_title
             FROM problems p
             JOIN chapters c ON c.id = p.chapter_id{}
             ORDER BY p.chapter_id ASC, p.problem_number ASC",
            PROBLEM_COLUMNS, where_clause,
        );

        let mut query = sqlx::query_as::<_, ProblemTitleRow>(&sql);
        if let Some(chapter_id) = filter.chapter_id {
            query = query.bind(chapter_id);
        }
        if let Some(ref search) = filter.search {
            query = query.bind(search_pattern(search));
        }
        if let Some(difficulty) = filter.difficulty {
            query = query.bind(difficulty);
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(ProblemListItem::from).collect())
    }

    /// One problem with its full parent chapter.
    pub async fn get_problem(&self, id: Uuid) -> Result<Option<ProblemDetail>> {
        let sql = format!(
            "SELECT {}, {}
             FROM problems p
             JOIN chapters c ON c.id = p.chapter_id
             WHERE p.id = $1",
            PROBLEM_COLUMNS, CHAPTER_COLUMNS,
        );
        let row = sqlx::query_as::<_, ProblemChapterRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(ProblemDetail::from))
    }

    /// Insert a problem under an existing chapter.
    ///
    /// The insert selects from `chapters`, so a `chapter_id` that names no
    /// chapter inserts nothing and yields `None`.
    pub async fn create_problem(&self, problem: &NewProblem) -> Result<Option<ProblemListItem>> {
        let sql = format!(
            "WITH p AS (
                 INSERT INTO problems (id, chapter_id, problem_number, title, description,
                                       difficulty, status, youtube_video_id, duration)
                 SELECT $1, ch.id, $3, $4, $5, $6, $7, $8, $9
                 FROM chapters ch WHERE ch.id = $2
                 RETURNING *
             )
             SELECT {}, c.title AS chapter_title
             FROM p JOIN chapters c ON c.id = p.chapter_id",
            PROBLEM_COLUMNS,
        );
        let row = sqlx::query_as::<_, ProblemTitleRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(problem.chapter_id)
            .bind(problem.problem_number)
            .bind(&problem.title)
            .bind(&problem.description)
            .bind(problem.difficulty)
            .bind(problem.status)
            .bind(&problem.youtube_video_id)
            .bind(problem.duration)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(ProblemListItem::from))
    }

    /// Apply a partial update. Returns `None` when no problem has `id`.
    pub async fn update_problem(&self, id: Uuid, update: &ProblemUpdate) -> Result<Option<ProblemDetail>> {
        let sql = format!(
            "WITH p AS (
                 UPDATE problems SET {} WHERE id = $1 RETURNING *
             )
             SELECT {}, {}
             FROM p JOIN chapters c ON c.id = p.chapter_id",
            update.assignments().join(", "),
            PROBLEM_COLUMNS,
            CHAPTER_COLUMNS,
        );

        let mut query = sqlx::query_as::<_, ProblemChapterRow>(&sql).bind(id);
        if let Some(ref title) = update.title {
            query = query.bind(title);
        }
        if let Some(ref description) = update.description {
            query = query.bind(description);
        }
        if let Some(difficulty) = update.difficulty {
            query = query.bind(difficulty);
        }
        if let Some(ref video) = update.youtube_video_id {
            query = query.bind(video.as_deref());
        }
        if let Some(duration) = update.duration {
            query = query.bind(duration);
        }
        if let Some(status) = update.status {
            query = query.bind(status);
        }

        let row = query.fetch_optional(&self.pool).await?;
        Ok(row.map(ProblemDetail::from))
    }

    /// Delete a problem. Returns `false` when no problem has `id`.
    pub async fn delete_problem(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM problems WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
