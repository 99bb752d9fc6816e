//! Engine settings.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable prefix for settings overrides.
pub const ENV_PREFIX: &str = "STRATA";

/// Errors raised while assembling settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A required value was not provided.
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    /// A value was provided but is unusable.
    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// The settings sources could not be read or decoded.
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
}

/// A group the engine addresses both by ID (for creation and transfer)
/// and by path (for lookup).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: u64,
    pub path: String,
}

impl GroupRef {
    pub fn new(id: u64, path: impl Into<String>) -> Self {
        Self {
            id,
            path: path.into(),
        }
    }
}

/// Settings for the configuration repository engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSettings {
    /// Parent of every application's ConfigGroup.
    applications_parent: GroupRef,

    /// Parent of every RecycleGroup.
    recycling_parent: GroupRef,

    /// Branch holding configuration files.
    #[serde(default = "default_branch")]
    branch: String,

    /// Upper bound on environments per application.
    #[serde(default = "default_max_environments")]
    max_environments: u32,

    /// Timeout applied to each remote call.
    #[serde(default = "default_request_timeout", with = "duration_secs")]
    request_timeout: Duration,
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_max_environments() -> u32 {
    50
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

impl RepoSettings {
    pub fn builder() -> RepoSettingsBuilder {
        RepoSettingsBuilder::default()
    }

    pub fn applications_parent(&self) -> &GroupRef {
        &self.applications_parent
    }

    pub fn recycling_parent(&self) -> &GroupRef {
        &self.recycling_parent
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn max_environments(&self) -> u32 {
        self.max_environments
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    fn validate(self) -> Result<Self, SettingsError> {
        if self.branch.is_empty() {
            return Err(SettingsError::Invalid {
                field: "branch",
                reason: "cannot be empty".to_string(),
            });
        }
        if self.max_environments == 0 {
            return Err(SettingsError::Invalid {
                field: "max_environments",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(SettingsError::Invalid {
                field: "request_timeout",
                reason: "must be positive".to_string(),
            });
        }
        Ok(self)
    }
}

/// Builder for [`RepoSettings`].
#[derive(Debug, Default)]
pub struct RepoSettingsBuilder {
    applications_parent: Option<GroupRef>,
    recycling_parent: Option<GroupRef>,
    branch: Option<String>,
    max_environments: Option<u32>,
    request_timeout: Option<Duration>,
}

impl RepoSettingsBuilder {
    pub fn applications_parent(mut self, id: u64, path: impl Into<String>) -> Self {
        self.applications_parent = Some(GroupRef::new(id, path));
        self
    }

    pub fn recycling_parent(mut self, id: u64, path: impl Into<String>) -> Self {
        self.recycling_parent = Some(GroupRef::new(id, path));
        self
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn max_environments(mut self, max: u32) -> Self {
        self.max_environments = Some(max);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if either parent group is missing or a value is out of range.
    pub fn build(self) -> Result<RepoSettings, SettingsError> {
        RepoSettings {
            applications_parent: self
                .applications_parent
                .ok_or(SettingsError::Missing("applications_parent"))?,
            recycling_parent: self
                .recycling_parent
                .ok_or(SettingsError::Missing("recycling_parent"))?,
            branch: self.branch.unwrap_or_else(default_branch),
            max_environments: self
                .max_environments
                .unwrap_or_else(default_max_environments),
            request_timeout: self.request_timeout.unwrap_or_else(default_request_timeout),
        }
        .validate()
    }
}

/// Connection settings for [`GitLabProvider`](crate::provider::GitLabProvider).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitLabSettings {
    base_url: String,
    token: String,
}

impl GitLabSettings {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for GitLabSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabSettings")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Complete settings document.
///
/// ```yaml
/// repo:
///   applications_parent: { id: 10, path: platform/applications }
///   recycling_parent: { id: 11, path: platform/recycling }
///   branch: master
/// gitlab:
///   base_url: https://git.example.com
///   token: glpat-...
/// ```
///
/// Every key can be overridden from the environment, e.g.
/// `STRATA_GITLAB__TOKEN` or `STRATA_REPO__REQUEST_TIMEOUT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub repo: RepoSettings,
    pub gitlab: GitLabSettings,
}

impl Settings {
    /// Loads settings from an optional YAML file layered under
    /// `STRATA_`-prefixed environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path).format(config::FileFormat::Yaml),
            );
        }

        let settings: Settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(Self {
            repo: settings.repo.validate()?,
            gitlab: settings.gitlab,
        })
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}
