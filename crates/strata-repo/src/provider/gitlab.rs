//! GitLab REST v4 provider.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{Commit, CommitAction, GitProvider, Group, Project, ProviderResult};
use crate::error::ProviderError;
use crate::settings::GitLabSettings;

const PRIVATE_TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// A [`GitProvider`] backed by the GitLab REST API.
///
/// Groups and projects are addressed by URL-encoded full path, which
/// GitLab accepts anywhere a numeric ID is expected.
pub struct GitLabProvider {
    client: Client,
    api_base: String,
    token: String,
}

#[derive(Serialize)]
struct CreateGroupBody<'a> {
    name: &'a str,
    path: &'a str,
    parent_id: u64,
}

#[derive(Serialize)]
struct CreateProjectBody<'a> {
    name: &'a str,
    path: &'a str,
    namespace_id: u64,
}

#[derive(Serialize)]
struct TransferBody {
    namespace: u64,
}

#[derive(Serialize)]
struct CommitBody<'a> {
    branch: &'a str,
    commit_message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_branch: Option<&'a str>,
    actions: &'a [CommitAction],
}

impl GitLabProvider {
    /// Creates a provider from settings, using a fresh HTTP client.
    pub fn new(settings: &GitLabSettings) -> Self {
        Self::with_client(Client::new(), settings)
    }

    /// Creates a provider sharing an existing HTTP client.
    pub fn with_client(client: Client, settings: &GitLabSettings) -> Self {
        Self {
            client,
            api_base: format!("{}/api/v4", settings.base_url().trim_end_matches('/')),
            token: settings.token().to_string(),
        }
    }

    fn url(&self, resource: &str, id: &str, tail: &str) -> String {
        format!(
            "{}/{}/{}{}",
            self.api_base,
            resource,
            urlencoding::encode(id),
            tail
        )
    }

    fn collection_url(&self, resource: &str) -> String {
        format!("{}/{}", self.api_base, resource)
    }

    async fn send(
        &self,
        request: RequestBuilder,
        resource: &str,
        path: &str,
    ) -> ProviderResult<Response> {
        let response = request
            .header(PRIVATE_TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        debug!("gitlab: {} {} answered {}: {}", resource, path, status, message);

        Err(match status {
            StatusCode::NOT_FOUND => ProviderError::not_found(resource, path),
            StatusCode::CONFLICT => ProviderError::Conflict(message),
            // GitLab reports namespace collisions as 400
            StatusCode::BAD_REQUEST if message.contains("has already been taken") => {
                ProviderError::Conflict(message)
            },
            other => ProviderError::Status {
                status: other.as_u16(),
                message,
            },
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        resource: &str,
        path: &str,
    ) -> ProviderResult<T> {
        self.send(request, resource, path)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

#[async_trait]
impl GitProvider for GitLabProvider {
    async fn get_group(&self, path: &str) -> ProviderResult<Group> {
        let request = self.client.get(self.url("groups", path, ""));
        self.send_json(request, "group", path).await
    }

    async fn create_group(&self, name: &str, path: &str, parent_id: u64) -> ProviderResult<Group> {
        let request = self
            .client
            .post(self.collection_url("groups"))
            .json(&CreateGroupBody {
                name,
                path,
                parent_id,
            });
        self.send_json(request, "group", path).await
    }

    async fn delete_group(&self, path: &str) -> ProviderResult<()> {
        let request = self.client.delete(self.url("groups", path, ""));
        self.send(request, "group", path).await.map(|_| ())
    }

    async fn get_project(&self, path: &str) -> ProviderResult<Project> {
        let request = self.client.get(self.url("projects", path, ""));
        self.send_json(request, "project", path).await
    }

    async fn create_project(&self, name: &str, group_id: u64) -> ProviderResult<Project> {
        let request = self
            .client
            .post(self.collection_url("projects"))
            .json(&CreateProjectBody {
                name,
                path: name,
                namespace_id: group_id,
            });
        self.send_json(request, "project", name).await
    }

    async fn delete_project(&self, path: &str) -> ProviderResult<()> {
        let request = self.client.delete(self.url("projects", path, ""));
        self.send(request, "project", path).await.map(|_| ())
    }

    async fn transfer_project(&self, project_id: u64, group_id: u64) -> ProviderResult<()> {
        let id = project_id.to_string();
        let request = self
            .client
            .put(self.url("projects", &id, "/transfer"))
            .json(&TransferBody {
                namespace: group_id,
            });
        self.send(request, "project", &id).await.map(|_| ())
    }

    async fn get_file(
        &self,
        project: &str,
        branch: &str,
        file_path: &str,
    ) -> ProviderResult<Vec<u8>> {
        let tail = format!(
            "/repository/files/{}/raw",
            urlencoding::encode(file_path)
        );
        let request = self
            .client
            .get(self.url("projects", project, &tail))
            .query(&[("ref", branch)]);
        let display = format!("{}/{}", project, file_path);

        let bytes = self
            .send(request, "file", &display)
            .await?
            .bytes()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn write_files(
        &self,
        project: &str,
        branch: &str,
        message: &str,
        start_branch: Option<&str>,
        actions: &[CommitAction],
    ) -> ProviderResult<Commit> {
        let request = self
            .client
            .post(self.url("projects", project, "/repository/commits"))
            .json(&CommitBody {
                branch,
                commit_message: message,
                start_branch,
                actions,
            });
        self.send_json(request, "project", project).await
    }

    async fn list_group_projects(
        &self,
        group: &str,
        page: u32,
        per_page: u32,
    ) -> ProviderResult<Vec<Project>> {
        let request = self
            .client
            .get(self.url("groups", group, "/projects"))
            .query(&[("page", page), ("per_page", per_page)]);
        self.send_json(request, "group", group).await
    }

    fn name(&self) -> &str {
        "gitlab"
    }
}

impl std::fmt::Debug for GitLabProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabProvider")
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GitLabProvider {
        GitLabProvider::new(&GitLabSettings::new("https://git.example.com/", "secret"))
    }

    #[test]
    fn test_paths_are_encoded() {
        let gitlab = provider();

        assert_eq!(
            gitlab.url("groups", "applications/web", ""),
            "https://git.example.com/api/v4/groups/applications%2Fweb"
        );
        assert_eq!(
            gitlab.url("projects", "applications/web/default", "/repository/commits"),
            "https://git.example.com/api/v4/projects/applications%2Fweb%2Fdefault/repository/commits"
        );
    }

    #[test]
    fn test_commit_body() {
        let actions = [CommitAction::update("pipeline.yaml", "a: 1\n")];
        let body = serde_json::to_value(CommitBody {
            branch: "master",
            commit_message: "msg",
            start_branch: None,
            actions: &actions,
        })
        .unwrap();

        assert_eq!(body["branch"], "master");
        assert!(body.get("start_branch").is_none());
        assert_eq!(body["actions"][0]["action"], "update");
    }

    #[test]
    fn test_debug_hides_token() {
        let rendered = format!("{:?}", provider());
        assert!(!rendered.contains("secret"));
    }
}
