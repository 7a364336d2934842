// GitHub API HTTP client.
// Handles authentication, the single 5xx retry, and rate-limit detection.

use std::time::Duration;

use rand::Rng;
use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use tracing::{info, warn};

use crate::error::{Result, StarpickError};

use super::types::RawRepository;

const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// GitHub API client. The token is optional; without one, requests run
/// unauthenticated against the lower public rate limit.
pub struct GitHubClient {
    client: Client,
}

impl GitHubClient {
    /// Create a new GitHub client, attaching a bearer token when provided.
    pub fn new(token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();

        if let Some(token) = token {
            info!("using provided GitHub API token");
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| StarpickError::Other(e.to_string()))?,
            );
        } else {
            warn!("no GitHub API token provided, using public access with a lower rate limit");
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("starpick"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(StarpickError::Api)?;

        Ok(Self { client })
    }

    /// Fetch one page of a repository listing.
    pub async fn get_page(
        &self,
        endpoint: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<RawRepository>> {
        let response = self.request(endpoint, page, per_page).await?;
        let repos: Vec<RawRepository> = response.json().await.map_err(StarpickError::Api)?;
        Ok(repos)
    }

    /// Make a GET request, retrying exactly once on a server error.
    async fn request(&self, endpoint: &str, page: u32, per_page: u32) -> Result<Response> {
        let url = format!("{}{}", GITHUB_API_BASE, endpoint);
        let params = [("page", page.to_string()), ("per_page", per_page.to_string())];

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(StarpickError::Api)?;

        if response.status().is_server_error() {
            let seconds = rand::thread_rng().gen_range(1..=5);
            warn!(
                status = response.status().as_u16(),
                "server error, retrying in {} seconds", seconds
            );
            tokio::time::sleep(Duration::from_secs(seconds)).await;

            let response = self
                .client
                .get(&url)
                .query(&params)
                .send()
                .await
                .map_err(StarpickError::Api)?;
            return check_response(response).await;
        }

        check_response(response).await
    }
}

/// Check response status and convert failures into the error taxonomy.
async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    match status {
        StatusCode::OK => Ok(response),
        StatusCode::TOO_MANY_REQUESTS => Err(StarpickError::RateLimited),
        StatusCode::FORBIDDEN => {
            let url = response.url().to_string();
            let body = response.text().await.unwrap_or_default();
            if body.contains("rate limit exceeded") {
                Err(StarpickError::RateLimited)
            } else {
                Err(StarpickError::Http {
                    status: status.as_u16(),
                    url,
                })
            }
        }
        status => {
            let url = response.url().to_string();
            Err(StarpickError::Http {
                status: status.as_u16(),
                url,
            })
        }
    }
}
