//! Minimal JSON REST client shared by the Bitbucket and GitHub sides.

use crate::error::{MigrationError, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

/// How requests are authenticated.
#[derive(Clone)]
pub enum ApiAuth {
    /// HTTP Basic authentication (Bitbucket username + app password).
    Basic { username: String, password: String },
    /// Bearer token (GitHub personal access token).
    Bearer(String),
}

impl std::fmt::Debug for ApiAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"***").finish(),
        }
    }
}

/// Authenticated JSON client bound to one API root.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: ApiAuth,
    platform: &'static str,
}

impl ApiClient {
    /// Create a new client for `platform` rooted at `base_url`.
    pub fn new(platform: &'static str, base_url: impl Into<String>, auth: ApiAuth) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("hgmove/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MigrationError::NetworkError(e.to_string()))?;

        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            platform,
        })
    }

    /// The API root without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of `path` under the API root.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Absolute URL of the path made of `segments` under the API root.
    ///
    /// Every segment is percent-encoded, so a `/` or space inside one stays
    /// part of that segment.
    pub fn segments_url(&self, segments: &[&str]) -> Result<String> {
        let invalid = || {
            MigrationError::InvalidConfig(format!(
                "{} API root is not a base URL: {}",
                self.platform, self.base_url
            ))
        };

        let mut url = url::Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            ApiAuth::Basic { username, password } => request.basic_auth(username, Some(password)),
            ApiAuth::Bearer(token) => request.bearer_auth(token),
        }
    }

    /// GET an absolute URL.
    pub async fn get_url<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let request = self.authorize(self.client.get(url));
        self.send(request, url).await
    }

    /// POST a JSON body to `path` under the API root.
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        let request = self.authorize(self.client.post(&url).json(body));
        self.send(request, &url).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, url: &str) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| MigrationError::NetworkError(e.to_string()))?;

        let response = self.check_status(response, url).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| MigrationError::NetworkError(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| {
            MigrationError::MalformedResponse(format!("{} ({url}): {e}", self.platform))
        })
    }

    async fn check_status(&self, response: Response, url: &str) -> Result<Response> {
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED => Err(MigrationError::AuthenticationFailed(format!(
                "Invalid {} credentials",
                self.platform
            ))),
            StatusCode::NOT_FOUND => Err(MigrationError::NotFound(url.to_string())),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(MigrationError::ApiError(format!(
                    "{} API error ({status}): {body}",
                    self.platform
                )))
            }
        }
    }
}
