use crate::errors::{AppError, AppResult};
use crate::models::{is_known_status, Project};
use crate::store::{new_project_id, Mutation, ProjectStore};
use crate::timestamp::Timestamp;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Where a dragged project lands on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveTarget {
    /// Dropped on a status column.
    Status(String),
    /// Dropped on another project; takes its status and position.
    Project(String),
}

/// Mutation API over a [`ProjectStore`]. Every call is one full
/// load-modify-save cycle under the store lock.
#[derive(Debug, Clone)]
pub struct ProjectService {
    store: Arc<ProjectStore>,
}

impl ProjectService {
    pub fn new(store: Arc<ProjectStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    /// Lenient listing for UI callers: a load failure is logged and shows up
    /// as an empty list. Nothing is written in that case.
    pub fn get_all(&self) -> Vec<Project> {
        match self.store.load() {
            Ok(projects) => projects,
            Err(error) => {
                tracing::warn!(error = %error, "failed to load projects");
                Vec::new()
            }
        }
    }

    pub fn try_get_all(&self) -> AppResult<Vec<Project>> {
        self.store.load()
    }

    pub fn find_by_id(&self, id: &str) -> AppResult<Option<Project>> {
        Ok(self.store.load()?.into_iter().find(|project| project.id == id))
    }

    /// Inserts or replaces by id and returns the record as stored. New
    /// projects go to the front of the collection.
    pub fn upsert(&self, mut project: Project) -> AppResult<Project> {
        prepare_for_upsert(&mut project);
        let stored = project.clone();
        self.store.update(|projects| {
            merge_project(projects, project);
            Ok(((), Mutation::Changed))
        })?;
        tracing::debug!(project_id = %stored.id, "project saved");
        Ok(stored)
    }

    /// Returns `false` when no project has `id`; the file is not touched then.
    pub fn delete(&self, id: &str) -> AppResult<bool> {
        let removed = self.store.update(|projects| {
            let before = projects.len();
            projects.retain(|project| project.id != id);
            if projects.len() == before {
                Ok((false, Mutation::Unchanged))
            } else {
                Ok((true, Mutation::Changed))
            }
        })?;
        if removed {
            tracing::debug!(project_id = %id, "project deleted");
        }
        Ok(removed)
    }

    /// Stores `projects` verbatim. No defaults are filled in.
    pub fn replace_all(&self, projects: &[Project]) -> AppResult<()> {
        self.store.save(projects)
    }

    pub fn delete_all(&self) -> AppResult<usize> {
        let count = self.store.update(|projects| {
            let count = projects.len();
            projects.clear();
            Ok((count, Mutation::Changed))
        })?;
        tracing::info!(count, "deleted all projects");
        Ok(count)
    }

    /// Merges `incoming` by id with upsert semantics in a single write.
    pub fn import(&self, incoming: Vec<Project>) -> AppResult<usize> {
        if incoming.is_empty() {
            return Ok(0);
        }

        let count = incoming.len();
        self.store.update(|projects| {
            for mut project in incoming {
                prepare_for_upsert(&mut project);
                merge_project(projects, project);
            }
            Ok(((), Mutation::Changed))
        })?;
        tracing::info!(count, "imported projects");
        Ok(count)
    }

    /// Parses a JSON array of projects and imports it. Any record that fails
    /// to parse rejects the whole payload before the store is touched.
    pub fn import_json(&self, bytes: &[u8]) -> AppResult<usize> {
        let incoming: Vec<Project> = serde_json::from_slice(bytes)
            .map_err(|error| AppError::CorruptData(format!("import rejected: {error}")))?;
        self.import(incoming)
    }

    pub fn import_file(&self, path: &Path) -> AppResult<usize> {
        let bytes = fs::read(path).map_err(|error| {
            AppError::StorageIo(format!("failed to read {}: {error}", path.display()))
        })?;
        tracing::info!(path = %path.display(), size = bytes.len(), "importing projects");
        self.import_json(&bytes)
    }

    /// Puts the listed ids first, in the given order, and renumbers
    /// `sort_order` for the whole collection.
    pub fn reorder(&self, ids: &[String]) -> AppResult<()> {
        let positions: HashMap<&str, usize> = ids
            .iter()
            .enumerate()
            .map(|(index, id)| (id.as_str(), index))
            .collect();

        self.store.update(|projects| {
            projects.sort_by_key(|project| {
                positions
                    .get(project.id.as_str())
                    .copied()
                    .unwrap_or(usize::MAX)
            });
            renumber(projects);
            Ok(((), Mutation::Changed))
        })
    }

    /// Board drag-and-drop. Returns `false` when `id` is unknown.
    pub fn move_project(&self, id: &str, target: MoveTarget) -> AppResult<bool> {
        self.store.update(|projects| {
            let Some(active) = projects.iter().position(|project| project.id == id) else {
                return Ok((false, Mutation::Unchanged));
            };

            let (status, over) = match &target {
                MoveTarget::Status(status) => (Some(status.clone()), None),
                MoveTarget::Project(over_id) => {
                    let over = projects.iter().position(|project| &project.id == over_id);
                    (over.map(|index| projects[index].status.clone()), over)
                }
            };

            if let Some(status) = status {
                if projects[active].status != status {
                    if !is_known_status(&status) {
                        tracing::debug!(status = %status, "moving project to unlisted status");
                    }
                    projects[active].status = status;
                    projects[active].updated_at = Timestamp::now();
                }
            }

            if let Some(over) = over {
                if over != active {
                    let moved = projects.remove(active);
                    projects.insert(over, moved);
                }
            }

            renumber(projects);
            Ok((true, Mutation::Changed))
        })
    }
}

fn prepare_for_upsert(project: &mut Project) {
    project.ensure_defaults();
    if project.id.is_empty() {
        project.id = new_project_id();
    }
}

fn merge_project(projects: &mut Vec<Project>, project: Project) {
    match projects.iter_mut().find(|existing| existing.same_identity(&project)) {
        Some(existing) => *existing = project,
        None => projects.insert(0, project),
    }
}

fn renumber(projects: &mut [Project]) {
    for (index, project) in projects.iter_mut().enumerate() {
        project.sort_order = index as i64;
    }
}
