//! Catalog-wide aggregates for the landing pages.

use super::{CatalogStats, Database, DifficultyCount, StatusCount};
use anyhow::Result;

#[derive(sqlx::FromRow)]
struct ProblemTotals {
    problems: i64,
    with_video: i64,
    video_seconds: i64,
}

impl Database {
    /// Chapter and problem totals, per-status and per-difficulty counts, and
    /// how much of the catalog has a video solution.
    pub async fn get_stats(&self) -> Result<CatalogStats> {
        let chapters: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chapters")
            .fetch_one(&self.pool)
            .await?;

        let totals = sqlx::query_as::<_, ProblemTotals>(
            "SELECT COUNT(*) AS problems,
                    COUNT(youtube_video_id) AS with_video,
                    COALESCE(SUM(duration) FILTER (WHERE youtube_video_id IS NOT NULL), 0)::BIGINT
                        AS video_seconds
             FROM problems",
        )
        .fetch_one(&self.pool)
        .await?;

        let by_status = sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM problems GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        let by_difficulty = sqlx::query_as::<_, DifficultyCount>(
            "SELECT difficulty, COUNT(*) AS count FROM problems GROUP BY difficulty ORDER BY difficulty",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(CatalogStats {
            chapters,
            problems: totals.problems,
            by_status,
            by_difficulty,
            with_video: totals.with_video,
            video_seconds: totals.video_seconds,
        })
    }
}
