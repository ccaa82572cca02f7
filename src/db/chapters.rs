//! Chapter CRUD operations.
//!
//! Chapters are listed by `sort_order` with a per-chapter problem count, and
//! fetched individually with their problems attached. Deletion is refused
//! while a chapter still owns problems.

use super::{Chapter, ChapterDetail, ChapterSummary, ChapterUpdate, Database, NewChapter, Problem, ProblemCount};
use anyhow::Result;
use uuid::Uuid;

/// Result of a chapter delete attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterDeletion {
    Deleted,
    NotFound,
    /// The chapter still owns this many problems and was left in place.
    HasProblems(i64),
}

#[derive(sqlx::FromRow)]
struct ChapterCountRow {
    #[sqlx(flatten)]
    chapter: Chapter,
    problem_count: i64,
}

impl Database {
    /// All chapters ordered by `order` ascending, each with its problem count.
    pub async fn list_chapters(&self) -> Result<Vec<ChapterSummary>> {
        let rows = sqlx::query_as::<_, ChapterCountRow>(
            "SELECT c.id, c.title, c.description, c.sort_order, c.created_at, c.updated_at,
                    COUNT(p.id) AS problem_count
             FROM chapters c
             LEFT JOIN problems p ON p.chapter_id = c.id
             GROUP BY c.id
             ORDER BY c.sort_order ASC, c.created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| ChapterSummary {
                chapter: r.chapter,
                count: ProblemCount {
                    problems: r.problem_count,
                },
            })
            .collect())
    }

    pub async fn get_chapter(&self, id: Uuid) -> Result<Option<Chapter>> {
        let chapter = sqlx::query_as::<_, Chapter>(
            "SELECT id, title, description, sort_order, created_at, updated_at
             FROM chapters WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(chapter)
    }

    /// One chapter with its problems ordered by `problem_number` ascending.
    pub async fn get_chapter_detail(&self, id: Uuid) -> Result<Option<ChapterDetail>> {
        let Some(chapter) = self.get_chapter(id).await? else {
            return Ok(None);
        };
        let problems = sqlx::query_as::<_, Problem>(
            "SELECT id, chapter_id, problem_number, title, description, difficulty, status,
                    youtube_video_id, duration, created_at, updated_at
             FROM problems
             WHERE chapter_id = $1
             ORDER BY problem_number ASC, created_at ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(Some(ChapterDetail { chapter, problems }))
    }

    pub async fn create_chapter(&self, chapter: &NewChapter) -> Result<Chapter> {
        let created = sqlx::query_as::<_, Chapter>(
            "INSERT INTO chapters (id, title, description, sort_order)
             VALUES ($1, $2, $3, $4)
             RETURNING id, title, description, sort_order, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(&chapter.title)
        .bind(&chapter.description)
        .bind(chapter.order)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Overwrite every mutable field. Returns `None` when no chapter has `id`.
    pub async fn update_chapter(&self, id: Uuid, update: &ChapterUpdate) -> Result<Option<Chapter>> {
        let updated = sqlx::query_as::<_, Chapter>(
            "UPDATE chapters
             SET title = $2, description = $3, sort_order = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING id, title, description, sort_order, created_at, updated_at",
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.order)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    /// Delete a chapter unless it still owns problems.
    ///
    /// The chapter row is locked for the duration of the check so a problem
    /// cannot be attached between the count and the delete.
    pub async fn delete_chapter(&self, id: Uuid) -> Result<ChapterDeletion> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM chapters WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(ChapterDeletion::NotFound);
        }

        let problems: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM problems WHERE chapter_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if problems > 0 {
            return Ok(ChapterDeletion::HasProblems(problems));
        }

        sqlx::query("DELETE FROM chapters WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(ChapterDeletion::Deleted)
    }
}
