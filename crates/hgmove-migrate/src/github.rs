//! Creating repositories on GitHub.

use crate::client::{ApiAuth, ApiClient};
use crate::error::Result;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Serialize)]
struct CreateRepoRequest<'a> {
    name: &'a str,
    private: bool,
}

/// GitHub API response types
#[derive(Debug, Deserialize)]
struct GitHubRepo {
    full_name: String,
}

/// Destination-side repository creation.
#[async_trait]
pub trait RepositoryCreator: Send + Sync {
    /// Create repository `name` and return its fully qualified name.
    async fn create_repository(&self, name: &str, private: bool) -> Result<String>;
}

/// Creates repositories for the authenticated user through the GitHub REST API.
///
/// There is no existence check: creating a name twice fails with the API's
/// validation error.
pub struct GitHubCreator {
    client: ApiClient,
}

impl GitHubCreator {
    /// Create a new creator authenticating with a personal access token.
    pub fn new(api_root: &str, access_token: &str) -> Result<Self> {
        let client = ApiClient::new("GitHub", api_root, ApiAuth::Bearer(access_token.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RepositoryCreator for GitHubCreator {
    async fn create_repository(&self, name: &str, private: bool) -> Result<String> {
        let repo: GitHubRepo = self
            .client
            .post("/user/repos", &CreateRepoRequest { name, private })
            .await?;

        info!(name, full_name = %repo.full_name, private, "Created GitHub repository");
        Ok(repo.full_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MigrationError;
    use serde_json::json;
    use wiremock::matchers::{bearer_token, body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_create_private_repository() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .and(bearer_token("ghp_token"))
            .and(body_json(json!({ "name": "alpha_PRIVATE", "private": true })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 1,
                "name": "alpha_PRIVATE",
                "full_name": "octo/alpha_PRIVATE",
                "private": true,
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let creator = GitHubCreator::new(&mock_server.uri(), "ghp_token").unwrap();
        let full_name = creator.create_repository("alpha_PRIVATE", true).await.unwrap();
        assert_eq!(full_name, "octo/alpha_PRIVATE");
    }

    #[tokio::test]
    async fn test_existing_repository_conflict() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "message": "Repository creation failed.",
                "errors": [{ "message": "name already exists on this account" }],
            })))
            .mount(&mock_server)
            .await;

        let creator = GitHubCreator::new(&mock_server.uri(), "ghp_token").unwrap();
        let err = creator
            .create_repository("alpha_PRIVATE", true)
            .await
            .unwrap_err();
        match err {
            MigrationError::ApiError(msg) => assert!(msg.contains("already exists")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
