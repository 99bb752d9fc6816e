//! In-process provider with GitLab-like semantics.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use super::{Commit, CommitAction, FileAction, GitProvider, Group, Project, ProviderResult};
use crate::error::ProviderError;

type Tree = BTreeMap<String, Vec<u8>>;

#[derive(Debug)]
struct ProjectEntry {
    project: Project,
    branches: HashMap<String, Tree>,
    commits: Vec<Commit>,
}

#[derive(Debug, Default)]
struct Store {
    next_id: u64,
    groups: BTreeMap<String, Group>,
    projects: BTreeMap<String, ProjectEntry>,
}

impl Store {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn group_by_id(&self, id: u64) -> ProviderResult<&Group> {
        self.groups
            .values()
            .find(|g| g.id == id)
            .ok_or_else(|| ProviderError::not_found("group", id.to_string()))
    }
}

/// Keeps groups, projects and files in memory.
///
/// Mirrors the hosting-service rules the engine depends on: creating an
/// existing file fails, updating a missing file fails, a multi-file
/// commit applies all of its actions or none, and deleting a group
/// removes everything beneath it.
///
/// Root groups (the fixed parents) must be seeded with
/// [`MemoryProvider::ensure_root_group`] before use.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    store: RwLock<Store>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a top-level group if it does not exist yet.
    pub fn ensure_root_group(&self, path: &str) -> Group {
        let mut store = self.store.write();
        if let Some(group) = store.groups.get(path) {
            return group.clone();
        }

        let id = store.allocate_id();
        let segment = path.rsplit('/').next().unwrap_or(path).to_string();
        let group = Group {
            id,
            name: segment.clone(),
            path: segment,
            full_path: path.to_string(),
        };
        store.groups.insert(path.to_string(), group.clone());
        group
    }

    /// Returns the commits made to a project, oldest first.
    pub fn commit_log(&self, project: &str) -> Vec<Commit> {
        self.store
            .read()
            .projects
            .get(project)
            .map(|entry| entry.commits.clone())
            .unwrap_or_default()
    }

    /// Returns true if a group exists at `path`.
    pub fn has_group(&self, path: &str) -> bool {
        self.store.read().groups.contains_key(path)
    }

    /// Returns true if a project exists at `path`.
    pub fn has_project(&self, path: &str) -> bool {
        self.store.read().projects.contains_key(path)
    }
}

fn apply_action(tree: &mut Tree, action: &CommitAction) -> ProviderResult<()> {
    let content = || action.content.clone().unwrap_or_default().into_bytes();

    match action.action {
        FileAction::Create => {
            if tree.contains_key(&action.file_path) {
                return Err(ProviderError::Status {
                    status: 400,
                    message: format!("A file with this name already exists: {}", action.file_path),
                });
            }
            tree.insert(action.file_path.clone(), content());
        },
        FileAction::Update => {
            let Some(existing) = tree.get_mut(&action.file_path) else {
                return Err(ProviderError::Status {
                    status: 400,
                    message: format!("A file with this name doesn't exist: {}", action.file_path),
                });
            };
            *existing = content();
        },
        FileAction::Move => {
            let previous = action.previous_path.as_deref().unwrap_or_default();
            let Some(old) = tree.remove(previous) else {
                return Err(ProviderError::Status {
                    status: 400,
                    message: format!("A file with this name doesn't exist: {}", previous),
                });
            };
            if tree.contains_key(&action.file_path) {
                return Err(ProviderError::Status {
                    status: 400,
                    message: format!("A file with this name already exists: {}", action.file_path),
                });
            }
            let moved = match &action.content {
                Some(body) => body.clone().into_bytes(),
                None => old,
            };
            tree.insert(action.file_path.clone(), moved);
        },
        FileAction::Delete => {
            if tree.remove(&action.file_path).is_none() {
                return Err(ProviderError::Status {
                    status: 400,
                    message: format!("A file with this name doesn't exist: {}", action.file_path),
                });
            }
        },
    }

    Ok(())
}

fn parent_namespace(path: &str) -> &str {
    path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

#[async_trait]
impl GitProvider for MemoryProvider {
    async fn get_group(&self, path: &str) -> ProviderResult<Group> {
        self.store
            .read()
            .groups
            .get(path)
            .cloned()
            .ok_or_else(|| ProviderError::not_found("group", path))
    }

    async fn create_group(&self, name: &str, path: &str, parent_id: u64) -> ProviderResult<Group> {
        let mut store = self.store.write();
        let parent = store.group_by_id(parent_id)?;
        let full_path = format!("{}/{}", parent.full_path, path);

        if store.groups.contains_key(&full_path) {
            return Err(ProviderError::Conflict(format!(
                "group {} has already been taken",
                full_path
            )));
        }

        let group = Group {
            id: store.allocate_id(),
            name: name.to_string(),
            path: path.to_string(),
            full_path: full_path.clone(),
        };
        store.groups.insert(full_path, group.clone());
        debug!("memory: created group {}", group.full_path);
        Ok(group)
    }

    async fn delete_group(&self, path: &str) -> ProviderResult<()> {
        let mut store = self.store.write();
        if !store.groups.contains_key(path) {
            return Err(ProviderError::not_found("group", path));
        }

        let prefix = format!("{}/", path);
        store
            .groups
            .retain(|full, _| full != path && !full.starts_with(&prefix));
        store.projects.retain(|full, _| !full.starts_with(&prefix));
        Ok(())
    }

    async fn get_project(&self, path: &str) -> ProviderResult<Project> {
        self.store
            .read()
            .projects
            .get(path)
            .map(|entry| entry.project.clone())
            .ok_or_else(|| ProviderError::not_found("project", path))
    }

    async fn create_project(&self, name: &str, group_id: u64) -> ProviderResult<Project> {
        let mut store = self.store.write();
        let group = store.group_by_id(group_id)?;
        let full_path = format!("{}/{}", group.full_path, name);

        if store.projects.contains_key(&full_path) {
            return Err(ProviderError::Conflict(format!(
                "project {} has already been taken",
                full_path
            )));
        }

        let project = Project {
            id: store.allocate_id(),
            name: name.to_string(),
            path: name.to_string(),
            path_with_namespace: full_path.clone(),
        };
        store.projects.insert(
            full_path,
            ProjectEntry {
                project: project.clone(),
                branches: HashMap::new(),
                commits: Vec::new(),
            },
        );
        Ok(project)
    }

    async fn delete_project(&self, path: &str) -> ProviderResult<()> {
        self.store
            .write()
            .projects
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| ProviderError::not_found("project", path))
    }

    async fn transfer_project(&self, project_id: u64, group_id: u64) -> ProviderResult<()> {
        let mut store = self.store.write();
        let target = store.group_by_id(group_id)?.full_path.clone();

        let current = store
            .projects
            .iter()
            .find(|(_, entry)| entry.project.id == project_id)
            .map(|(path, _)| path.clone())
            .ok_or_else(|| ProviderError::not_found("project", project_id.to_string()))?;

        let mut entry = store
            .projects
            .remove(&current)
            .ok_or_else(|| ProviderError::not_found("project", current.clone()))?;
        let new_path = format!("{}/{}", target, entry.project.path);

        if store.projects.contains_key(&new_path) {
            store.projects.insert(current, entry);
            return Err(ProviderError::Conflict(format!(
                "project {} has already been taken",
                new_path
            )));
        }

        entry.project.path_with_namespace = new_path.clone();
        store.projects.insert(new_path, entry);
        Ok(())
    }

    async fn get_file(
        &self,
        project: &str,
        branch: &str,
        file_path: &str,
    ) -> ProviderResult<Vec<u8>> {
        let store = self.store.read();
        let entry = store
            .projects
            .get(project)
            .ok_or_else(|| ProviderError::not_found("project", project))?;
        let tree = entry
            .branches
            .get(branch)
            .ok_or_else(|| ProviderError::not_found("branch", format!("{}@{}", project, branch)))?;

        tree.get(file_path)
            .cloned()
            .ok_or_else(|| ProviderError::not_found("file", format!("{}/{}", project, file_path)))
    }

    async fn write_files(
        &self,
        project: &str,
        branch: &str,
        message: &str,
        start_branch: Option<&str>,
        actions: &[CommitAction],
    ) -> ProviderResult<Commit> {
        let mut store = self.store.write();
        let sequence = store.allocate_id();
        let entry = store
            .projects
            .get_mut(project)
            .ok_or_else(|| ProviderError::not_found("project", project))?;

        let mut tree = match (entry.branches.get(branch), start_branch) {
            (Some(tree), _) => tree.clone(),
            (None, Some(start)) => entry
                .branches
                .get(start)
                .cloned()
                .ok_or_else(|| ProviderError::not_found("branch", format!("{}@{}", project, start)))?,
            (None, None) if entry.branches.is_empty() => Tree::new(),
            (None, None) => {
                return Err(ProviderError::not_found(
                    "branch",
                    format!("{}@{}", project, branch),
                ));
            },
        };

        for action in actions {
            apply_action(&mut tree, action)?;
        }

        let id = format!("{:040x}", sequence);
        let commit = Commit {
            short_id: id[id.len() - 8..].to_string(),
            id,
            message: message.to_string(),
        };
        entry.branches.insert(branch.to_string(), tree);
        entry.commits.push(commit.clone());
        Ok(commit)
    }

    async fn list_group_projects(
        &self,
        group: &str,
        page: u32,
        per_page: u32,
    ) -> ProviderResult<Vec<Project>> {
        let store = self.store.read();
        if !store.groups.contains_key(group) {
            return Err(ProviderError::not_found("group", group));
        }

        let skip = (page.max(1) as usize - 1) * per_page as usize;
        Ok(store
            .projects
            .values()
            .filter(|entry| parent_namespace(&entry.project.path_with_namespace) == group)
            .map(|entry| entry.project.clone())
            .skip(skip)
            .take(per_page as usize)
            .collect())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
