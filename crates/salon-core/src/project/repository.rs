//! Remote project tier trait.

use async_trait::async_trait;

use salon_types::Project;

use crate::error::Result;

/// Remote, account-scoped tier of the project collection.
///
/// Reads are allowed without a token; writes require one. The HTTP client
/// implements this; tests inject doubles.
#[async_trait]
pub trait ProjectsRemote: Send + Sync {
    /// Fetches the full remote collection.
    async fn fetch_projects(&self, token: Option<&str>) -> Result<Vec<Project>>;

    /// Replaces the full remote collection.
    async fn push_projects(&self, projects: &[Project], token: &str) -> Result<Vec<Project>>;
}
