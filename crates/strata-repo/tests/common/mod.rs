#![allow(dead_code)]
//! Shared fixtures for repository engine integration tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use strata_repo::provider::ProviderResult;
use strata_repo::strata_core::{Actor, Application, ConfigMap};
use strata_repo::{
    Commit, CommitAction, ConfigRepoService, GitProvider, Group, MemoryProvider, Project,
    ProviderError, RecycleBinManager, RepoSettings,
};

pub const BRANCH: &str = "master";

/// Installs a test-writer subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Wraps a [`MemoryProvider`] and injects failures and latency.
#[derive(Default)]
pub struct FaultyProvider {
    pub inner: MemoryProvider,
    project_faults: Mutex<HashMap<String, ProviderError>>,
    group_faults: Mutex<HashMap<String, ProviderError>>,
    file_faults: Mutex<HashMap<String, ProviderError>>,
    file_delays: Mutex<HashMap<String, Duration>>,
    transfer_faults: Mutex<HashSet<u64>>,
    lost_transfers: Mutex<HashSet<u64>>,
    calls: Mutex<Vec<String>>,
}

impl FaultyProvider {
    pub fn fail_project(&self, path: &str, err: ProviderError) {
        self.project_faults.lock().insert(path.to_string(), err);
    }

    pub fn fail_group(&self, path: &str, err: ProviderError) {
        self.group_faults.lock().insert(path.to_string(), err);
    }

    pub fn fail_file(&self, file_path: &str, err: ProviderError) {
        self.file_faults.lock().insert(file_path.to_string(), err);
    }

    pub fn delay_file(&self, file_path: &str, delay: Duration) {
        self.file_delays.lock().insert(file_path.to_string(), delay);
    }

    pub fn fail_transfer(&self, project_id: u64) {
        self.transfer_faults.lock().insert(project_id);
    }

    /// Makes the transfer of `project_id` report success without moving it.
    pub fn lose_transfer(&self, project_id: u64) {
        self.lost_transfers.lock().insert(project_id);
    }

    pub fn clear_faults(&self) {
        self.project_faults.lock().clear();
        self.group_faults.lock().clear();
        self.file_faults.lock().clear();
        self.file_delays.lock().clear();
        self.transfer_faults.lock().clear();
        self.lost_transfers.lock().clear();
    }

    /// Operation names in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls.lock().iter().filter(|c| *c == operation).count()
    }

    fn record(&self, operation: &str) {
        self.calls.lock().push(operation.to_string());
    }
}

#[async_trait]
impl GitProvider for FaultyProvider {
    async fn get_group(&self, path: &str) -> ProviderResult<Group> {
        self.record("get_group");
        if let Some(err) = self.group_faults.lock().get(path).cloned() {
            return Err(err);
        }
        self.inner.get_group(path).await
    }

    async fn create_group(&self, name: &str, path: &str, parent_id: u64) -> ProviderResult<Group> {
        self.record("create_group");
        self.inner.create_group(name, path, parent_id).await
    }

    async fn delete_group(&self, path: &str) -> ProviderResult<()> {
        self.record("delete_group");
        self.inner.delete_group(path).await
    }

    async fn get_project(&self, path: &str) -> ProviderResult<Project> {
        self.record("get_project");
        if let Some(err) = self.project_faults.lock().get(path).cloned() {
            return Err(err);
        }
        self.inner.get_project(path).await
    }

    async fn create_project(&self, name: &str, group_id: u64) -> ProviderResult<Project> {
        self.record("create_project");
        self.inner.create_project(name, group_id).await
    }

    async fn delete_project(&self, path: &str) -> ProviderResult<()> {
        self.record("delete_project");
        self.inner.delete_project(path).await
    }

    async fn transfer_project(&self, project_id: u64, group_id: u64) -> ProviderResult<()> {
        self.record("transfer_project");
        if self.transfer_faults.lock().contains(&project_id) {
            return Err(ProviderError::Status {
                status: 403,
                message: "transfer forbidden".to_string(),
            });
        }
        if self.lost_transfers.lock().contains(&project_id) {
            return Ok(());
        }
        self.inner.transfer_project(project_id, group_id).await
    }

    async fn get_file(
        &self,
        project: &str,
        branch: &str,
        file_path: &str,
    ) -> ProviderResult<Vec<u8>> {
        self.record("get_file");
        let delay = self.file_delays.lock().get(file_path).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.file_faults.lock().get(file_path).cloned() {
            return Err(err);
        }
        self.inner.get_file(project, branch, file_path).await
    }

    async fn write_files(
        &self,
        project: &str,
        branch: &str,
        message: &str,
        start_branch: Option<&str>,
        actions: &[CommitAction],
    ) -> ProviderResult<Commit> {
        self.record("write_files");
        self.inner
            .write_files(project, branch, message, start_branch, actions)
            .await
    }

    async fn list_group_projects(
        &self,
        group: &str,
        page: u32,
        per_page: u32,
    ) -> ProviderResult<Vec<Project>> {
        self.record("list_group_projects");
        self.inner.list_group_projects(group, page, per_page).await
    }

    fn name(&self) -> &str {
        "faulty"
    }
}

/// A wired-up engine over a fault-injecting in-memory provider.
pub struct Fixture {
    pub provider: Arc<FaultyProvider>,
    pub service: ConfigRepoService,
    pub bin: RecycleBinManager,
    pub actor: Actor,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        init_tracing();

        let provider = Arc::new(FaultyProvider::default());
        let apps = provider.inner.ensure_root_group("platform/applications");
        let bin = provider.inner.ensure_root_group("platform/recycling");
        let settings = RepoSettings::builder()
            .applications_parent(apps.id, apps.full_path)
            .recycling_parent(bin.id, bin.full_path)
            .branch(BRANCH)
            .max_environments(10)
            .request_timeout(timeout)
            .build()
            .expect("valid settings");

        Self {
            service: ConfigRepoService::from_settings(provider.clone(), settings.clone()),
            bin: RecycleBinManager::from_settings(provider.clone(), settings),
            provider,
            actor: Actor::new("alice"),
        }
    }
}

pub fn app() -> Application {
    Application::new("checkout", 42)
}

pub fn project_path(app: &Application, environment: &str) -> String {
    format!("platform/applications/{}/{}", app.name(), environment)
}

pub fn build_config() -> ConfigMap {
    ConfigMap::from_yaml(
        r#"
image: golang:1.22
steps:
  - name: test
    run: go test ./...
  - name: build
    run: go build -o bin/app
cache: true
"#,
        "fixture",
    )
    .expect("valid fixture")
}

pub fn template_config() -> ConfigMap {
    ConfigMap::from_yaml(
        r#"
replicas: 3
resources:
  cpu: 500m
  memory: 1Gi
ratio: 0.75
env:
  LOG_LEVEL: info
"#,
        "fixture",
    )
    .expect("valid fixture")
}
