//! Client-owned project collection.
//!
//! The store is local-first: every mutation updates memory, rewrites the
//! durable local document, and — when an authentication token is present —
//! pushes the whole collection to the remote tier. Remote failures are
//! logged and never roll back local state.

use std::sync::Arc;

use tokio::sync::RwLock;

use salon_types::{Product, Project};

use crate::project::repository::ProjectsRemote;
use crate::storage::{load_json, save_json, DocumentStore, PROJECTS_DOC};

/// Manages the user's named product collections.
pub struct ProjectStore {
    projects: RwLock<Vec<Project>>,
    local: Arc<dyn DocumentStore>,
    remote: Option<Arc<dyn ProjectsRemote>>,
    token: RwLock<Option<String>>,
}

impl ProjectStore {
    /// Creates a store backed only by the local document store.
    pub fn new(local: Arc<dyn DocumentStore>) -> Self {
        Self {
            projects: RwLock::new(Vec::new()),
            local,
            remote: None,
            token: RwLock::new(None),
        }
    }

    /// Attaches the remote tier.
    pub fn with_remote(mut self, remote: Arc<dyn ProjectsRemote>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Sets or clears the bearer token gating remote writes.
    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    /// Loads the collection, preferring the remote tier.
    ///
    /// Policy: a non-empty remote collection wins outright. An empty but
    /// reachable remote falls back to the local snapshot and, if that
    /// snapshot is non-empty, pushes it up once (one-directional bootstrap
    /// sync, not a merge). An unreachable remote falls back to local
    /// without pushing.
    pub async fn load(&self) {
        let local_projects: Vec<Project> =
            match load_json(self.local.as_ref(), PROJECTS_DOC).await {
                Ok(projects) => projects.unwrap_or_default(),
                Err(err) => {
                    tracing::warn!(error = %err, "failed to read local project snapshot");
                    Vec::new()
                }
            };

        let token = self.token.read().await.clone();
        let loaded = match &self.remote {
            Some(remote) => match remote.fetch_projects(token.as_deref()).await {
                Ok(remote_projects) if !remote_projects.is_empty() => remote_projects,
                Ok(_) => {
                    if !local_projects.is_empty() {
                        match token.as_deref() {
                            Some(token) => {
                                if let Err(err) =
                                    remote.push_projects(&local_projects, token).await
                                {
                                    tracing::warn!(error = %err, "bootstrap project sync failed");
                                }
                            }
                            None => {
                                tracing::debug!(
                                    "remote projects empty, no token: skipping bootstrap sync"
                                );
                            }
                        }
                    }
                    local_projects
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to load remote projects, using local");
                    local_projects
                }
            },
            None => local_projects,
        };

        *self.projects.write().await = loaded;
    }

    /// Returns a clone of the current collection (newest project first).
    pub async fn projects(&self) -> Vec<Project> {
        self.projects.read().await.clone()
    }

    /// Creates a project with an optional seed item and prepends it.
    pub async fn create_project(&self, name: impl Into<String>, seed: Option<Product>) -> Project {
        let project = {
            let mut projects = self.projects.write().await;
            let project = Project {
                id: fresh_project_id(&projects),
                name: name.into(),
                items: seed.into_iter().collect(),
            };
            projects.insert(0, project.clone());
            project
        };
        self.persist().await;
        project
    }

    /// Adds a product to one project; a duplicate slug is a no-op.
    pub async fn add_to_project(&self, project_id: &str, product: Product) {
        let changed = {
            let mut projects = self.projects.write().await;
            projects
                .iter_mut()
                .find(|p| p.id == project_id)
                .is_some_and(|p| p.prepend_unique(product))
        };
        if changed {
            self.persist().await;
        }
    }

    /// Removes every item with the given slug from one project.
    pub async fn remove_from_project(&self, project_id: &str, slug: &str) {
        {
            let mut projects = self.projects.write().await;
            if let Some(project) = projects.iter_mut().find(|p| p.id == project_id) {
                project.remove_item(slug);
            }
        }
        self.persist().await;
    }

    /// Replaces a project's name.
    pub async fn rename_project(&self, project_id: &str, new_name: impl Into<String>) {
        {
            let mut projects = self.projects.write().await;
            if let Some(project) = projects.iter_mut().find(|p| p.id == project_id) {
                project.name = new_name.into();
            }
        }
        self.persist().await;
    }

    /// Persists a full snapshot locally and, token permitting, remotely.
    ///
    /// Both writes degrade to a log line on failure; the in-memory state
    /// is already updated and is never rolled back.
    async fn persist(&self) {
        let snapshot = self.projects.read().await.clone();

        if let Err(err) = save_json(self.local.as_ref(), PROJECTS_DOC, &snapshot).await {
            tracing::warn!(error = %err, "failed to persist projects locally");
        }

        let token = self.token.read().await.clone();
        if let (Some(remote), Some(token)) = (&self.remote, token) {
            if let Err(err) = remote.push_projects(&snapshot, &token).await {
                tracing::warn!(error = %err, "failed to push projects to remote");
            }
        }
    }
}

/// Millisecond-timestamp id, bumped past any existing id on collision.
fn fresh_project_id(projects: &[Project]) -> String {
    let mut candidate = chrono::Utc::now().timestamp_millis();
    while projects.iter().any(|p| p.id == candidate.to_string()) {
        candidate += 1;
    }
    candidate.to_string()
}
