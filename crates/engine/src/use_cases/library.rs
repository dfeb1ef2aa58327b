//! Library computer search.

use std::sync::Arc;

use starbridge_domain::{
    default_library, DomainError, LibraryEntry, LibraryQuery, MAX_LIBRARY_RESULTS,
};

use crate::infrastructure::ports::{LibraryRepo, RepoError};

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("{}", .0.reason())]
    Rule(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub struct LibraryOps {
    library: Arc<dyn LibraryRepo>,
}

impl LibraryOps {
    pub fn new(library: Arc<dyn LibraryRepo>) -> Self {
        Self { library }
    }

    /// Returns the normalized query alongside at most [`MAX_LIBRARY_RESULTS`] hits.
    pub async fn search(&self, raw: &str) -> Result<(String, Vec<LibraryEntry>), LibraryError> {
        let query = LibraryQuery::parse(raw)?;
        let limit = u32::try_from(MAX_LIBRARY_RESULTS).unwrap_or(u32::MAX);
        let results = self.library.search(&query, limit).await?;
        Ok((query.as_str().to_string(), results))
    }

    /// Load the reference entries into an empty library. Returns how many were added.
    pub async fn seed_defaults(&self) -> Result<usize, LibraryError> {
        if self.library.count().await? > 0 {
            return Ok(0);
        }
        let entries = default_library();
        for entry in &entries {
            self.library.save(entry).await?;
        }
        tracing::info!(entries = entries.len(), "Seeded library computer");
        Ok(entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockLibraryRepo;

    #[tokio::test]
    async fn when_query_too_short_then_rejected_without_search() {
        let mut repo = MockLibraryRepo::new();
        repo.expect_search().times(0);

        let err = LibraryOps::new(Arc::new(repo))
            .search(" j ")
            .await
            .expect_err("too short");
        assert_eq!(err.to_string(), "Search query must be at least 2 characters");
    }

    #[tokio::test]
    async fn when_searching_then_query_is_normalized_and_capped() {
        let mut repo = MockLibraryRepo::new();
        repo.expect_search()
            .withf(|query, limit| query.as_str() == "jump drive" && *limit == 20)
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let (query, results) = LibraryOps::new(Arc::new(repo))
            .search("  Jump Drive ")
            .await
            .expect("search");
        assert_eq!(query, "jump drive");
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn when_library_already_populated_then_seeding_skips() {
        let mut repo = MockLibraryRepo::new();
        repo.expect_count().returning(|| Ok(3));
        repo.expect_save().times(0);

        let added = LibraryOps::new(Arc::new(repo))
            .seed_defaults()
            .await
            .expect("seed");
        assert_eq!(added, 0);
    }
}
