//! Transactional import of a [`SeedCatalog`].

use super::Database;
use crate::seed::SeedCatalog;
use anyhow::Result;
use uuid::Uuid;

/// Rows written by [`Database::seed_catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub chapters: usize,
    pub problems: usize,
}

impl Database {
    /// Insert every chapter and problem of `catalog` in one transaction.
    ///
    /// With `reset`, all existing problems and chapters are removed first.
    /// Either the whole catalog lands or nothing does.
    pub async fn seed_catalog(&self, catalog: &SeedCatalog, reset: bool) -> Result<SeedSummary> {
        let mut tx = self.pool.begin().await?;

        if reset {
            sqlx::query("DELETE FROM problems").execute(&mut *tx).await?;
            sqlx::query("DELETE FROM chapters").execute(&mut *tx).await?;
        }

        let mut problems = 0;
        for chapter in &catalog.chapters {
            let chapter_id = Uuid::new_v4();
            sqlx::query(
                "INSERT INTO chapters (id, title, description, sort_order) VALUES ($1, $2, $3, $4)",
            )
            .bind(chapter_id)
            .bind(&chapter.title)
            .bind(&chapter.description)
            .bind(chapter.order)
            .execute(&mut *tx)
            .await?;

            for problem in &chapter.problems {
                sqlx::query(
                    "INSERT INTO problems (id, chapter_id, problem_number, title, description,
                                           difficulty, status, youtube_video_id, duration)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                )
                .bind(Uuid::new_v4())
                .bind(chapter_id)
                .bind(problem.number)
                .bind(&problem.title)
                .bind(&problem.description)
                .bind(problem.difficulty)
                .bind(problem.status)
                .bind(&problem.youtube_video_id)
                .bind(problem.duration)
                .execute(&mut *tx)
                .await?;
                problems += 1;
            }
        }

        tx.commit().await?;
        Ok(SeedSummary {
            chapters: catalog.chapters.len(),
            problems,
        })
    }
}
