use crate::errors::{AppError, AppResult};
use crate::models::Project;
use serde::Deserialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::NamedTempFile;
use uuid::Uuid;

pub const STORE_FILE_NAME: &str = "projects.json";

/// Whether an [`ProjectStore::update`] closure changed the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Changed,
    Unchanged,
}

/// Sole owner of the on-disk project collection.
///
/// Every read and write of the backing file goes through one lock held by the
/// instance. Other processes writing the same file are not coordinated; the
/// last write wins.
#[derive(Debug)]
pub struct ProjectStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ProjectStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STORE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole collection, sorted by `sort_order` then most recently
    /// updated. Empty or duplicated ids and legacy record shapes are repaired
    /// and written back before returning.
    pub fn load(&self) -> AppResult<Vec<Project>> {
        let _guard = self.acquire()?;
        self.load_locked()
    }

    /// Replaces the whole file with `projects`.
    pub fn save(&self, projects: &[Project]) -> AppResult<()> {
        let _guard = self.acquire()?;
        self.write_locked(projects)
    }

    /// Runs a load-modify-save cycle under the lock. An error from `apply`
    /// leaves the file untouched, as does [`Mutation::Unchanged`].
    pub fn update<T, F>(&self, apply: F) -> AppResult<T>
    where
        F: FnOnce(&mut Vec<Project>) -> AppResult<(T, Mutation)>,
    {
        let _guard = self.acquire()?;
        let mut projects = self.load_locked()?;
        let (result, mutation) = apply(&mut projects)?;
        if mutation == Mutation::Changed {
            self.write_locked(&projects)?;
        }
        Ok(result)
    }

    fn acquire(&self) -> AppResult<MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| AppError::Internal("project store mutex poisoned".to_string()))
    }

    fn load_locked(&self) -> AppResult<Vec<Project>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "project store absent, starting empty");
                return Ok(Vec::new());
            }
            Err(error) => {
                return Err(AppError::StorageIo(format!(
                    "failed to read {}: {error}",
                    self.path.display()
                )))
            }
        };

        let document: Value = serde_json::from_slice(&bytes).map_err(|error| self.corrupt(error))?;
        let mut projects = Vec::<Project>::deserialize(&document).map_err(|error| self.corrupt(error))?;

        let legacy_shape = serde_json::to_value(&projects)? != document;
        let repaired = repair_identities(&mut projects);
        if repaired > 0 {
            tracing::warn!(path = %self.path.display(), count = repaired, "assigned fresh ids to projects");
        }
        if legacy_shape {
            tracing::warn!(path = %self.path.display(), "upgrading legacy project records");
        }
        if repaired > 0 || legacy_shape {
            self.write_locked(&projects)?;
        }

        sort_projects(&mut projects);
        tracing::debug!(path = %self.path.display(), count = projects.len(), "projects loaded");
        Ok(projects)
    }

    fn write_locked(&self, projects: &[Project]) -> AppResult<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|error| {
            AppError::StorageIo(format!("failed to create {}: {error}", parent.display()))
        })?;

        let bytes = serde_json::to_vec_pretty(projects)
            .map_err(|error| AppError::Internal(format!("failed to encode projects: {error}")))?;

        let mut staged = NamedTempFile::new_in(parent)?;
        staged.write_all(&bytes)?;
        staged.as_file().sync_all()?;
        staged.persist(&self.path)?;

        tracing::debug!(path = %self.path.display(), count = projects.len(), "projects written");
        Ok(())
    }

    fn corrupt(&self, error: serde_json::Error) -> AppError {
        AppError::CorruptData(format!("{}: {error}", self.path.display()))
    }
}

pub fn new_project_id() -> String {
    Uuid::new_v4().to_string()
}

/// Re-keys empty ids and every repeat of an id after its first occurrence.
/// Returns how many projects got a new id.
pub fn repair_identities(projects: &mut [Project]) -> usize {
    let mut seen = HashSet::with_capacity(projects.len());
    let mut repaired = 0;
    for project in projects.iter_mut() {
        if project.id.is_empty() || seen.contains(&project.id) {
            project.id = new_project_id();
            repaired += 1;
        }
        seen.insert(project.id.clone());
    }
    repaired
}

pub fn sort_projects(projects: &mut [Project]) {
    projects.sort_by(compare_projects);
}

fn compare_projects(a: &Project, b: &Project) -> Ordering {
    a.sort_order
        .cmp(&b.sort_order)
        .then_with(|| b.updated_at.cmp(&a.updated_at))
}
