use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use tokio::sync::RwLock;

use crate::config::{HttpConfig, RedditConfig, RedditCredentials};
use crate::error::{AppError, Result};
use crate::platform::types::*;
use crate::platform::Community;

use super::mapper::{self, CommentResponse, Listing, TokenResponse};

/// Reddit caps listings at 100 items per request.
const MAX_LISTING_LIMIT: u32 = 100;

/// Refresh the token this long before Reddit says it expires.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// Reddit OAuth client using the password grant of a "script" app.
pub struct RedditPlatform {
    credentials: RedditCredentials,
    auth_url: String,
    api_url: String,
    /// Used for writes and the token request; never retried.
    client: Client,
    /// Used for listings; retries transient failures with backoff.
    reads: ClientWithMiddleware,
    /// Cached bearer token and its expiry.
    token: RwLock<Option<(String, chrono::DateTime<chrono::Utc>)>>,
}

impl RedditPlatform {
    pub fn new(config: &RedditConfig, http: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.credentials.user_agent.clone())
            .timeout(http.timeout)
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_millis(500), Duration::from_secs(10))
            .build_with_max_retries(3);

        let reads = ClientBuilder::new(client.clone())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            credentials: config.credentials.clone(),
            auth_url: config.auth_url.trim_end_matches('/').to_string(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            client,
            reads,
            token: RwLock::new(None),
        })
    }

    async fn fetch_token(&self) -> Result<String> {
        let url = format!("{}/api/v1/access_token", self.auth_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[
                ("grant_type", "password"),
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Auth(format!(
                "Reddit token endpoint returned {status}: {body}"
            )));
        }

        let body = response.json::<TokenResponse>().await?;
        if let Some(error) = body.error {
            return Err(AppError::Auth(format!("Reddit rejected the login: {error}")));
        }

        let token = body
            .access_token
            .ok_or_else(|| AppError::Auth("No access_token in response".to_string()))?;

        let expires_at =
            chrono::Utc::now() + chrono::Duration::seconds(body.expires_in.unwrap_or(3600));

        let mut cache = self.token.write().await;
        *cache = Some((token.clone(), expires_at));

        Ok(token)
    }

    async fn access_token(&self) -> Result<String> {
        {
            let cache = self.token.read().await;
            if let Some((token, expiry)) = cache.as_ref() {
                if *expiry > chrono::Utc::now() + chrono::Duration::seconds(TOKEN_EXPIRY_MARGIN_SECS)
                {
                    return Ok(token.clone());
                }
            }
        }

        tracing::debug!("Reddit access token missing or expiring, logging in again");
        self.fetch_token().await
    }
}

#[async_trait]
impl Community for RedditPlatform {
    async fn authenticate(&self) -> Result<()> {
        self.fetch_token().await?;
        tracing::info!(username = %self.credentials.username, "Authenticated with Reddit");
        Ok(())
    }

    async fn newest_posts(&self, subreddit: &str, limit: u32) -> Result<Vec<Post>> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/r/{}/new?limit={}",
            self.api_url,
            urlencoding::encode(subreddit),
            limit.min(MAX_LISTING_LIMIT)
        );

        let response = self.reads.get(&url).bearer_auth(&token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::RedditApi(format!(
                "Listing r/{subreddit} returned {status}: {body}"
            )));
        }

        let listing = response.json::<Listing>().await?;
        Ok(mapper::map_listing(listing, subreddit))
    }

    async fn reply(&self, post: &Post, body: &str) -> Result<CreatedComment> {
        let token = self.access_token().await?;
        let url = format!("{}/api/comment", self.api_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .form(&[
                ("api_type", "json"),
                ("thing_id", post.fullname.as_str()),
                ("text", body),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AppError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let created = response.json::<CommentResponse>().await?;
        if !created.json.errors.is_empty() {
            return Err(AppError::RedditApi(mapper::describe_errors(
                &created.json.errors,
            )));
        }

        Ok(mapper::map_comment(created))
    }
}
