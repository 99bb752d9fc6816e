//! # Strata Configuration Repository
//!
//! Keeps each application's build and runtime configuration as
//! version-controlled files in a Git hosting service, one project per
//! deployment environment.
//!
//! ```text
//! {applications}/{app}/{environment}/
//!     manifest.yaml      { version: <string> }
//!     pipeline.yaml      build configuration
//!     application.yaml   template/runtime configuration
//! ```
//!
//! ## Features
//!
//! - Lazy creation of the application group and environment project on first write
//! - Partial writes: only the supplied categories are committed, in one commit
//! - Transparent fallback to the `default` environment on read
//! - Concurrent file fetches with per-file absence
//! - Soft delete into a recycle group, hard delete and purge
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use strata_core::{Actor, Application};
//! use strata_repo::{ConfigRepoService, GitLabProvider, RecycleBinManager, Settings};
//!
//! let settings = Settings::load(None)?;
//! let provider = Arc::new(GitLabProvider::new(&settings.gitlab));
//!
//! let repo = ConfigRepoService::from_settings(provider.clone(), settings.repo.clone());
//! let bin = RecycleBinManager::from_settings(provider, settings.repo);
//!
//! let app = Application::new("checkout", 42);
//! let config = repo.get(&app, "staging").await?;
//! bin.soft_delete(&Actor::new("alice"), &app).await?;
//! ```

pub mod commit;
pub mod error;
pub mod layout;
pub mod provider;
pub mod recycle;
mod remote;
pub mod service;
pub mod settings;

// Re-exports
pub use commit::{CommitBody, CommitMessage, CommitMessageBuilder};
pub use error::{ErrorKind, ProviderError, RepoError, Result};
pub use layout::{ConfigFile, EnvironmentPaths, PathResolver};
pub use provider::{
    Commit, CommitAction, FileAction, GitLabProvider, GitProvider, Group, MemoryProvider, Project,
};
pub use recycle::{RecycleBinManager, SoftDeleteReport};
pub use service::{ApplicationConfig, ConfigRepoService, ConfigUpdate, WriteReceipt};
pub use settings::{GitLabSettings, GroupRef, RepoSettings, Settings, SettingsError};

// Re-export strata_core for consumers
pub use strata_core;
