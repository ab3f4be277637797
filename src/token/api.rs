use super::auth::AppAuth;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub static DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Failed to sign app credential: {0}")]
    Credential(#[from] jsonwebtoken::errors::Error),
    #[error("Request to {url} failed: {source}")]
    RequestFailed { url: String, source: reqwest::Error },
    #[error("GitHub responded with {status} for {url}: {body}")]
    ErrorResponse {
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("Failed to deserialize response from {url}: {source}")]
    DeserializeFailed { url: String, source: reqwest::Error },
}

#[derive(Debug, Deserialize)]
pub struct Installation {
    pub id: u64,
    pub account: Account,
}

#[derive(Debug, Deserialize)]
pub struct Account {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: String,
}

#[derive(Debug, Serialize)]
struct AccessTokenRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    permissions: Option<&'a BTreeMap<String, String>>,
}

/// The two app-authenticated calls the token flow needs.
#[async_trait]
pub trait AppApi {
    async fn repo_installation(&self, owner: &str, repo: &str) -> Result<Installation, ApiError>;

    async fn create_installation_token(
        &self,
        installation_id: u64,
        permissions: Option<&BTreeMap<String, String>>,
    ) -> Result<AccessToken, ApiError>;
}

pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    auth: AppAuth,
}

impl GitHubClient {
    pub fn new(auth: AppAuth, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            auth,
        }
    }

    fn request(&self, method: Method, url: &str) -> Result<reqwest::RequestBuilder, ApiError> {
        let jwt = self.auth.issue_jwt()?;
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(jwt)
            .header("Accept", "application/vnd.github+json")
            .header(
                "User-Agent",
                concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
            )
            .header("X-GitHub-Api-Version", "2022-11-28"))
    }

    async fn send<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|source| ApiError::RequestFailed {
                url: url.to_owned(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::ErrorResponse {
                url: url.to_owned(),
                status,
                body,
            });
        }
        response
            .json()
            .await
            .map_err(|source| ApiError::DeserializeFailed {
                url: url.to_owned(),
                source,
            })
    }
}

#[async_trait]
impl AppApi for GitHubClient {
    async fn repo_installation(&self, owner: &str, repo: &str) -> Result<Installation, ApiError> {
        let url = format!("{}/repos/{}/{}/installation", self.base_url, owner, repo);
        log::info!("looking up installation at {}", url);
        let builder = self.request(Method::GET, &url)?;
        self.send(&url, builder).await
    }

    async fn create_installation_token(
        &self,
        installation_id: u64,
        permissions: Option<&BTreeMap<String, String>>,
    ) -> Result<AccessToken, ApiError> {
        let url = format!(
            "{}/app/installations/{}/access_tokens",
            self.base_url, installation_id
        );
        log::info!("requesting access token at {}", url);
        let builder = self
            .request(Method::POST, &url)?
            .json(&AccessTokenRequest { permissions });
        self.send(&url, builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permissions_omitted_when_absent() {
        let body = serde_json::to_string(&AccessTokenRequest { permissions: None }).unwrap();
        assert_eq!(body, "{}");
    }

    #[test]
    fn permissions_serialized_verbatim() {
        let permissions = BTreeMap::from([("contents".to_owned(), "read".to_owned())]);
        let body = serde_json::to_string(&AccessTokenRequest {
            permissions: Some(&permissions),
        })
        .unwrap();
        assert_eq!(body, r#"{"permissions":{"contents":"read"}}"#);
    }
}
