//! Soft and hard deletion of application configuration.

use std::sync::Arc;
use std::time::Duration;

use strata_core::{Actor, Application};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::error::{ProviderError, RepoError, Result};
use crate::layout::PathResolver;
use crate::provider::{GitProvider, Group, Project};
use crate::remote::{ProviderResultExt, bounded, join_failure};
use crate::settings::RepoSettings;

/// What a successful soft delete moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftDeleteReport {
    /// Full path of the RecycleGroup.
    pub recycle_group: String,
    /// New full paths of the relocated EnvironmentProjects.
    pub relocated: Vec<String>,
}

/// Retires an application's configuration.
///
/// Soft delete relocates every EnvironmentProject into a RecycleGroup
/// named `{application}-{id}` under the recycling parent and then removes
/// the emptied ConfigGroup. Content survives there until [`purge`].
/// Hard delete removes the ConfigGroup and everything in it.
///
/// Soft delete is not atomic across environments; see [`soft_delete`].
///
/// [`purge`]: RecycleBinManager::purge
/// [`soft_delete`]: RecycleBinManager::soft_delete
pub struct RecycleBinManager {
    provider: Arc<dyn GitProvider>,
    resolver: PathResolver,
    settings: RepoSettings,
}

impl RecycleBinManager {
    pub fn new(provider: Arc<dyn GitProvider>, resolver: PathResolver, settings: RepoSettings) -> Self {
        Self {
            provider,
            resolver,
            settings,
        }
    }

    pub fn from_settings(provider: Arc<dyn GitProvider>, settings: RepoSettings) -> Self {
        let resolver = PathResolver::new(
            settings.applications_parent().path.clone(),
            settings.recycling_parent().path.clone(),
        );
        Self::new(provider, resolver, settings)
    }

    fn timeout(&self) -> Duration {
        self.settings.request_timeout()
    }

    /// Moves the application's environments into its RecycleGroup.
    ///
    /// Transfers run concurrently and all of them are awaited before the
    /// outcome is decided. If any transfer fails the call returns
    /// [`RepoError::Aggregated`] and leaves the projects where the partial
    /// run put them: some under the RecycleGroup, the rest still in the
    /// original group, which is not deleted. Calling again resumes with
    /// the projects that remain.
    ///
    /// The original group is only deleted once a fresh listing shows it
    /// holds no projects.
    #[instrument(skip_all, fields(application = %app.name(), actor = %actor))]
    pub async fn soft_delete(&self, actor: &Actor, app: &Application) -> Result<SoftDeleteReport> {
        let group_path = self.resolver.config_group(app)?;
        let recycle_path = self.resolver.recycle_group(app)?;

        bounded(self.timeout(), self.provider.get_group(&group_path))
            .await
            .context("get_group", &group_path)?;

        let recycle = self.ensure_recycle_group(app, &recycle_path).await?;
        let projects = self.list_all_projects(&group_path).await?;

        debug!(
            "Transferring {} project(s) from {} to {}",
            projects.len(),
            group_path,
            recycle_path
        );

        let mut transfers = JoinSet::new();
        for project in projects {
            let provider = Arc::clone(&self.provider);
            let timeout = self.timeout();
            let target = recycle.id;

            transfers.spawn(async move {
                let result = bounded(timeout, provider.transfer_project(project.id, target)).await;
                (project, result)
            });
        }

        let mut relocated = Vec::new();
        let mut failures = Vec::new();
        while let Some(joined) = transfers.join_next().await {
            match joined {
                Ok((project, Ok(()))) => {
                    relocated.push(format!("{}/{}", recycle_path, project.path));
                },
                Ok((project, Err(e))) => {
                    failures.push(RepoError::provider(
                        "transfer_project",
                        project.path_with_namespace,
                        e,
                    ));
                },
                Err(e) => failures.push(join_failure("transfer_project", &group_path, e)),
            }
        }

        if !failures.is_empty() {
            warn!(
                "Soft delete of {} left {} environment(s) behind; {} relocated",
                group_path,
                failures.len(),
                relocated.len()
            );
            return Err(RepoError::Aggregated {
                operation: "soft_delete",
                errors: failures,
            });
        }

        let remaining = self.list_all_projects(&group_path).await?;
        if !remaining.is_empty() {
            warn!(
                "Soft delete of {} keeps the group: {} environment(s) still inside",
                group_path,
                remaining.len()
            );
            return Err(RepoError::Aggregated {
                operation: "soft_delete",
                errors: remaining
                    .into_iter()
                    .map(|project| {
                        RepoError::provider(
                            "delete_group",
                            project.path_with_namespace,
                            ProviderError::Conflict("project was not relocated".to_string()),
                        )
                    })
                    .collect(),
            });
        }

        bounded(self.timeout(), self.provider.delete_group(&group_path))
            .await
            .context("delete_group", &group_path)?;

        relocated.sort();
        info!(
            "Soft deleted {}: {} environment(s) moved to {}",
            group_path,
            relocated.len(),
            recycle_path
        );

        Ok(SoftDeleteReport {
            recycle_group: recycle_path,
            relocated,
        })
    }

    /// Reads every page of the group's projects, `max_environments` at a time.
    async fn list_all_projects(&self, group_path: &str) -> Result<Vec<Project>> {
        let per_page = self.settings.max_environments();
        let mut projects = Vec::new();

        for page in 1.. {
            let batch = bounded(
                self.timeout(),
                self.provider.list_group_projects(group_path, page, per_page),
            )
            .await
            .context("list_group_projects", group_path)?;

            let last = batch.len() < per_page as usize;
            projects.extend(batch);
            if last {
                break;
            }
        }

        Ok(projects)
    }

    /// Creates the RecycleGroup, reusing it if an earlier, partially
    /// failed soft delete already created it.
    async fn ensure_recycle_group(&self, app: &Application, recycle_path: &str) -> Result<Group> {
        let name = self.resolver.recycle_group_name(app)?;
        let parent = self.settings.recycling_parent();

        match bounded(self.timeout(), self.provider.create_group(&name, &name, parent.id)).await {
            Ok(group) => {
                info!("Created recycle group {}", group.full_path);
                Ok(group)
            },
            Err(ProviderError::Conflict(_)) => {
                debug!("Recycle group {} already exists", recycle_path);
                bounded(self.timeout(), self.provider.get_group(recycle_path))
                    .await
                    .context("get_group", recycle_path)
            },
            Err(e) => Err(RepoError::provider("create_group", recycle_path, e)),
        }
    }

    /// Deletes the application's ConfigGroup and everything beneath it.
    ///
    /// Nothing is relocated; this is an irrecoverable purge.
    #[instrument(skip_all, fields(application = %app.name(), actor = %actor))]
    pub async fn hard_delete(&self, actor: &Actor, app: &Application) -> Result<()> {
        let group_path = self.resolver.config_group(app)?;

        bounded(self.timeout(), self.provider.delete_group(&group_path))
            .await
            .context("delete_group", &group_path)?;

        info!("Hard deleted {}", group_path);
        Ok(())
    }

    /// Deletes the application's RecycleGroup, discarding soft-deleted content.
    #[instrument(skip_all, fields(application = %app.name(), actor = %actor))]
    pub async fn purge(&self, actor: &Actor, app: &Application) -> Result<()> {
        let recycle_path = self.resolver.recycle_group(app)?;

        bounded(self.timeout(), self.provider.delete_group(&recycle_path))
            .await
            .context("delete_group", &recycle_path)?;

        info!("Purged {}", recycle_path);
        Ok(())
    }
}

impl std::fmt::Debug for RecycleBinManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecycleBinManager")
            .field("provider", &self.provider.name())
            .field("resolver", &self.resolver)
            .finish()
    }
}
