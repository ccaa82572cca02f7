//! TOML catalog files for seeding the database.
//!
//! A catalog is a list of `[[chapter]]` tables, each with zero or more
//! `[[chapter.problem]]` entries. The Irodov catalog is embedded in the binary
//! and used when no file is given.

use crate::db::{Difficulty, ProblemStatus};
use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

/// The built-in catalog: the seven Irodov chapters and sample problems.
pub const DEFAULT_CATALOG: &str = include_str!("../seed/irodov.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct SeedCatalog {
    #[serde(rename = "chapter", default)]
    pub chapters: Vec<SeedChapter>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedChapter {
    pub title: String,
    pub description: Option<String>,
    pub order: i32,
    #[serde(rename = "problem", default)]
    pub problems: Vec<SeedProblem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedProblem {
    pub number: i32,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub status: ProblemStatus,
    pub youtube_video_id: Option<String>,
    pub duration: Option<i32>,
}

impl SeedCatalog {
    /// Parse and validate a catalog from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let catalog: SeedCatalog = toml::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog file, or the embedded Irodov catalog when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
                Self::from_toml(&content)
            }
            None => Self::from_toml(DEFAULT_CATALOG),
        }
    }

    pub fn problem_count(&self) -> usize {
        self.chapters.iter().map(|c| c.problems.len()).sum()
    }

    fn validate(&self) -> Result<()> {
        for (i, chapter) in self.chapters.iter().enumerate() {
            if chapter.title.trim().is_empty() {
                anyhow::bail!("chapter #{} has an empty title", i + 1);
            }
            for problem in &chapter.problems {
                if problem.title.trim().is_empty() {
                    anyhow::bail!(
                        "problem {} in chapter '{}' has an empty title",
                        problem.number,
                        chapter.title
                    );
                }
                if problem.duration.is_some_and(|d| d < 0) {
                    anyhow::bail!(
                        "problem {} in chapter '{}' has a negative duration",
                        problem.number,
                        chapter.title
                    );
                }
            }
        }
        Ok(())
    }
}
