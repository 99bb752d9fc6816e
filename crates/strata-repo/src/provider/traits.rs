//! Git hosting provider trait definition.

use async_trait::async_trait;

use super::{Commit, CommitAction, Group, Project};
use crate::error::ProviderError;

/// Result alias for provider calls.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// The subset of a Git hosting service the engine relies on.
///
/// Implementations are expected to be already authenticated. Paths are
/// full slash-separated namespace paths (`applications/checkout/default`);
/// IDs are the numeric identifiers assigned by the service.
///
/// # Implementors
///
/// - `GitLabProvider` - GitLab REST v4
/// - `MemoryProvider` - in-process store with GitLab-like semantics
///
/// Every method must report absence as [`ProviderError::NotFound`]; the
/// engine branches on that variant to decide between create and update
/// and to treat missing files as absent.
#[async_trait]
pub trait GitProvider: Send + Sync {
    /// Fetches a group by full path.
    async fn get_group(&self, path: &str) -> ProviderResult<Group>;

    /// Creates a group named `name` with path segment `path` under `parent_id`.
    async fn create_group(&self, name: &str, path: &str, parent_id: u64) -> ProviderResult<Group>;

    /// Deletes a group and everything beneath it.
    async fn delete_group(&self, path: &str) -> ProviderResult<()>;

    /// Fetches a project by full path.
    async fn get_project(&self, path: &str) -> ProviderResult<Project>;

    /// Creates an empty project named `name` inside group `group_id`.
    async fn create_project(&self, name: &str, group_id: u64) -> ProviderResult<Project>;

    /// Deletes a project by full path.
    async fn delete_project(&self, path: &str) -> ProviderResult<()>;

    /// Moves a project into another group.
    async fn transfer_project(&self, project_id: u64, group_id: u64) -> ProviderResult<()>;

    /// Reads the raw content of a file at the tip of `branch`.
    async fn get_file(&self, project: &str, branch: &str, file_path: &str)
    -> ProviderResult<Vec<u8>>;

    /// Applies all `actions` as a single commit on `branch`.
    ///
    /// `start_branch` names the branch to fork from when `branch` does
    /// not exist yet. Either every action lands or none does.
    async fn write_files(
        &self,
        project: &str,
        branch: &str,
        message: &str,
        start_branch: Option<&str>,
        actions: &[CommitAction],
    ) -> ProviderResult<Commit>;

    /// Lists the projects directly inside a group. `page` is 1-based.
    async fn list_group_projects(
        &self,
        group: &str,
        page: u32,
        per_page: u32,
    ) -> ProviderResult<Vec<Project>>;

    /// Returns the name of this provider, for logging.
    fn name(&self) -> &str;
}
