//! Per-environment application configuration service.

mod request;
mod response;

use std::sync::Arc;
use std::time::Duration;

use strata_core::{Actor, Application, ConfigMap};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument};

use crate::commit::CommitMessageBuilder;
use crate::error::{RepoError, Result};
use crate::layout::{ConfigFile, EnvironmentPaths, PathResolver};
use crate::provider::{CommitAction, FileAction, GitProvider, Group};
use crate::remote::{ProviderResultExt, bounded, join_failure};
use crate::settings::RepoSettings;

pub use request::ConfigUpdate;
pub use response::{ApplicationConfig, WriteReceipt};

/// Creates, updates and reads an application's per-environment
/// configuration stored in the Git hosting service.
///
/// Each environment is a project under the application's group holding
/// `manifest.yaml`, `pipeline.yaml` and `application.yaml` on a single
/// branch. Groups and projects are created lazily on first write.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use strata_core::{Actor, Application, ConfigMap};
/// use strata_repo::{ConfigRepoService, ConfigUpdate, GitLabProvider, Settings};
///
/// let settings = Settings::load(Some("strata.yaml".as_ref()))?;
/// let provider = Arc::new(GitLabProvider::new(&settings.gitlab));
/// let service = ConfigRepoService::from_settings(provider, settings.repo);
///
/// let app = Application::new("checkout", 42);
/// let update = ConfigUpdate::new().pipeline(ConfigMap::new().with("image", "golang:1.22"));
/// service.create_or_update(&Actor::new("alice"), &app, "staging", update).await?;
///
/// let config = service.get(&app, "staging").await?;
/// ```
pub struct ConfigRepoService {
    provider: Arc<dyn GitProvider>,
    resolver: PathResolver,
    messages: CommitMessageBuilder,
    settings: RepoSettings,
}

impl ConfigRepoService {
    /// Creates a service from its collaborators.
    pub fn new(provider: Arc<dyn GitProvider>, resolver: PathResolver, settings: RepoSettings) -> Self {
        Self {
            provider,
            resolver,
            messages: CommitMessageBuilder::new(),
            settings,
        }
    }

    /// Creates a service whose paths are rooted at the configured parents.
    pub fn from_settings(provider: Arc<dyn GitProvider>, settings: RepoSettings) -> Self {
        let resolver = PathResolver::new(
            settings.applications_parent().path.clone(),
            settings.recycling_parent().path.clone(),
        );
        Self::new(provider, resolver, settings)
    }

    /// Replaces the commit message builder.
    pub fn with_messages(mut self, messages: CommitMessageBuilder) -> Self {
        self.messages = messages;
        self
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn settings(&self) -> &RepoSettings {
        &self.settings
    }

    fn timeout(&self) -> Duration {
        self.settings.request_timeout()
    }

    /// Writes the supplied configuration categories for an environment.
    ///
    /// If the environment's project exists every staged file is an
    /// `update`; otherwise the group and project are created as needed
    /// and every staged file is a `create`. All staged files land in a
    /// single commit.
    ///
    /// # Errors
    ///
    /// - `ParamInvalid` if `update` is empty or a name is malformed
    /// - `ProviderError` / `NotFound` if any remote call fails; the
    ///   absence of the project or group is handled by creating them
    #[instrument(skip_all, fields(application = %app.name(), environment = %environment, actor = %actor))]
    pub async fn create_or_update(
        &self,
        actor: &Actor,
        app: &Application,
        environment: &str,
        update: ConfigUpdate,
    ) -> Result<WriteReceipt> {
        if update.is_empty() {
            return Err(RepoError::param_invalid(
                "update",
                "at least one of version, pipeline or application must be provided",
            ));
        }

        let paths = self.resolver.resolve(app, environment)?;
        let documents = update.into_documents();
        let rendered = documents
            .iter()
            .map(|(file, doc)| Ok((*file, doc.to_yaml()?)))
            .collect::<Result<Vec<_>>>()?;

        let action = self.prepare_project(app, &paths).await?;

        let actions: Vec<CommitAction> = rendered
            .into_iter()
            .map(|(file, content)| CommitAction::write(action, file.path(), content))
            .collect();
        let changes: Vec<(ConfigFile, &ConfigMap)> =
            documents.iter().map(|(file, doc)| (*file, doc)).collect();
        let message = self
            .messages
            .build(actor, action, app, &paths.environment, &changes)
            .render()?;

        let commit = bounded(
            self.timeout(),
            self.provider.write_files(
                &paths.project,
                self.settings.branch(),
                &message,
                None,
                &actions,
            ),
        )
        .await
        .context("write_files", &paths.project)?;

        info!(
            "Committed {} file(s) to {} ({}) at {}",
            actions.len(),
            paths.project,
            action,
            commit.short_id
        );

        Ok(WriteReceipt { action, commit })
    }

    /// Decides between create and update, creating the group and project
    /// when the project does not exist yet.
    async fn prepare_project(&self, app: &Application, paths: &EnvironmentPaths) -> Result<FileAction> {
        match bounded(self.timeout(), self.provider.get_project(&paths.project)).await {
            Ok(_) => return Ok(FileAction::Update),
            Err(e) if e.is_not_found() => {
                debug!("Project {} does not exist yet", paths.project);
            },
            Err(e) => return Err(RepoError::provider("get_project", &paths.project, e)),
        }

        let group = self.ensure_group(app, paths).await?;
        let project = bounded(
            self.timeout(),
            self.provider
                .create_project(paths.environment.as_str(), group.id),
        )
        .await
        .context("create_project", &paths.project)?;

        info!("Created project {}", project.path_with_namespace);
        Ok(FileAction::Create)
    }

    async fn ensure_group(&self, app: &Application, paths: &EnvironmentPaths) -> Result<Group> {
        match bounded(self.timeout(), self.provider.get_group(&paths.group)).await {
            Ok(group) => Ok(group),
            Err(e) if e.is_not_found() => {
                let parent = self.settings.applications_parent();
                let group = bounded(
                    self.timeout(),
                    self.provider.create_group(app.name(), app.name(), parent.id),
                )
                .await
                .context("create_group", &paths.group)?;

                info!("Created group {}", group.full_path);
                Ok(group)
            },
            Err(e) => Err(RepoError::provider("get_group", &paths.group, e)),
        }
    }

    /// Reads the configuration for an environment.
    ///
    /// Falls back to the `default` environment when the requested one has
    /// no project. The three files are fetched concurrently; a missing
    /// file is reported as absent, any other failure aborts the call and
    /// cancels the remaining fetches.
    ///
    /// # Errors
    ///
    /// - `ParamInvalid` if a name is malformed or a stored file is not a YAML mapping
    /// - `ProviderError` if a probe or fetch fails for any reason other than absence
    #[instrument(skip_all, fields(application = %app.name(), environment = %environment))]
    pub async fn get(&self, app: &Application, environment: &str) -> Result<ApplicationConfig> {
        let paths = self.resolver.resolve(app, environment)?;

        let probe = bounded(self.timeout(), self.provider.get_project(&paths.project)).await;
        let project = match probe {
            Ok(_) => paths.project,
            Err(e) if e.is_not_found() && !paths.environment.is_default() => {
                let fallback = self.resolver.environment_project(app, "")?;
                debug!(
                    "Environment {} has no project, reading {}",
                    paths.environment, fallback
                );
                fallback
            },
            Err(e) if e.is_not_found() => {
                debug!("Default environment has no project yet");
                return Ok(ApplicationConfig::default());
            },
            Err(e) => return Err(RepoError::provider("get_project", &paths.project, e)),
        };

        self.fetch_files(&project).await
    }

    async fn fetch_files(&self, project: &str) -> Result<ApplicationConfig> {
        let mut fetches = JoinSet::new();
        for file in ConfigFile::ALL {
            let provider = Arc::clone(&self.provider);
            let project = project.to_string();
            let branch = self.settings.branch().to_string();
            let timeout = self.timeout();

            fetches.spawn(async move {
                let result = bounded(timeout, provider.get_file(&project, &branch, file.path())).await;
                (file, result)
            });
        }

        let mut config = ApplicationConfig::default();
        while let Some(joined) = fetches.join_next().await {
            let (file, result) = joined.map_err(|e| join_failure("get_file", project, e))?;

            match result {
                Ok(bytes) => {
                    let map = ConfigMap::from_yaml_slice(&bytes, file.path())?;
                    config.set(file, map);
                },
                Err(e) if e.is_not_found() => {
                    debug!("{} is absent in {}", file, project);
                },
                Err(e) => {
                    return Err(RepoError::provider(
                        "get_file",
                        format!("{}/{}", project, file.path()),
                        e,
                    ));
                },
            }
        }

        Ok(config)
    }

    /// Lists the environments that have a project under the application's group.
    ///
    /// An application that was never written has no environments.
    #[instrument(skip_all, fields(application = %app.name()))]
    pub async fn list_environments(&self, app: &Application) -> Result<Vec<String>> {
        let group = self.resolver.config_group(app)?;

        match bounded(
            self.timeout(),
            self.provider
                .list_group_projects(&group, 1, self.settings.max_environments()),
        )
        .await
        {
            Ok(projects) => Ok(projects.into_iter().map(|p| p.path).collect()),
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            Err(e) => Err(RepoError::provider("list_group_projects", &group, e)),
        }
    }
}

impl std::fmt::Debug for ConfigRepoService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigRepoService")
            .field("provider", &self.provider.name())
            .field("resolver", &self.resolver)
            .field("branch", &self.settings.branch())
            .finish()
    }
}
