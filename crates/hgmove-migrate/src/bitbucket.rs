//! Listing Mercurial repositories on Bitbucket.

use crate::client::{ApiAuth, ApiClient};
use crate::error::Result;
use crate::types::HG_SCM;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

/// Bitbucket API response types
#[derive(Debug, Deserialize)]
struct BitbucketRepo {
    name: String,
    scm: String,
}

#[derive(Debug, Deserialize)]
struct BitbucketPaginated<T> {
    values: Vec<T>,
    next: Option<String>,
}

/// Source of the repository names to migrate.
#[async_trait]
pub trait RepositoryLister: Send + Sync {
    /// Names of the Mercurial repositories owned by `account`, in listing order.
    async fn list_repositories(&self, account: &str) -> Result<Vec<String>>;
}

/// Lists repositories through the Bitbucket 2.0 REST API.
pub struct BitbucketLister {
    client: ApiClient,
}

impl BitbucketLister {
    /// Create a lister authenticating with an app password.
    ///
    /// # Arguments
    ///
    /// * `api_root` - API root, e.g. `https://api.bitbucket.org/2.0`
    /// * `username` - Bitbucket username
    /// * `app_password` - Bitbucket app password
    pub fn new(api_root: &str, username: &str, app_password: &str) -> Result<Self> {
        let client = ApiClient::new(
            "Bitbucket",
            api_root,
            ApiAuth::Basic {
                username: username.to_string(),
                password: app_password.to_string(),
            },
        )?;
        Ok(Self { client })
    }

    async fn get_paginated(&self, initial_url: &str) -> Result<Vec<BitbucketRepo>> {
        let mut all_items = Vec::new();
        let mut url = Some(initial_url.to_string());

        while let Some(current_url) = url {
            println!("\n==> Get: {current_url}");
            let page: BitbucketPaginated<BitbucketRepo> =
                self.client.get_url(&current_url).await?;
            debug!(url = %current_url, count = page.values.len(), "Fetched page");

            all_items.extend(page.values);
            url = page.next;
        }

        Ok(all_items)
    }
}

#[async_trait]
impl RepositoryLister for BitbucketLister {
    async fn list_repositories(&self, account: &str) -> Result<Vec<String>> {
        let url = self.client.segments_url(&["repositories", account])?;
        let repos = self.get_paginated(&url).await?;
        let total = repos.len();

        let names: Vec<String> = repos
            .into_iter()
            .filter(|repo| repo.scm == HG_SCM)
            .map(|repo| repo.name)
            .collect();

        info!(account, total, hg = names.len(), "Listed Bitbucket repositories");
        Ok(names)
    }
}
