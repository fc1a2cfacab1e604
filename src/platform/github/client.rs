use async_trait::async_trait;
use octocrab::service::middleware::retry::RetryConfig;
use octocrab::Octocrab;
use serde::Serialize;

use crate::config::{GitHubConfig, HttpConfig};
use crate::error::{AppError, Result};
use crate::platform::types::*;
use crate::platform::RepositoryHost;

use super::mapper::{self, IssueResponse, SearchResponse};

#[derive(Debug, Serialize)]
struct SearchParams<'a> {
    q: &'a str,
    sort: &'a str,
    order: &'a str,
    per_page: u8,
}

#[derive(Debug, Serialize)]
struct CreateIssueBody<'a> {
    title: &'a str,
    body: &'a str,
}

/// GitHub REST client authenticated with a personal access token.
pub struct GitHubPlatform {
    /// Used for searches; keeps octocrab's retry on 5xx/429.
    reads: Octocrab,
    /// Used for issue creation; never retried.
    writes: Octocrab,
    api_url: String,
}

impl GitHubPlatform {
    pub fn new(config: &GitHubConfig, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            reads: Self::build_client(config, http, RetryConfig::Simple(3))?,
            writes: Self::build_client(config, http, RetryConfig::None)?,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn build_client(
        config: &GitHubConfig,
        http: &HttpConfig,
        retry: RetryConfig,
    ) -> Result<Octocrab> {
        Octocrab::builder()
            .personal_token(config.token.clone())
            .base_uri(config.api_url.as_str())
            .map_err(|e| AppError::Config(format!("Invalid GitHub API URL {}: {e}", config.api_url)))?
            .add_retry_config(retry)
            .set_connect_timeout(Some(http.timeout))
            .set_read_timeout(Some(http.timeout))
            .build()
            .map_err(|e| AppError::GitHubApi(format!("Failed to build octocrab client: {e}")))
    }

    fn parse_repo(repo_full_name: &str) -> Result<(&str, &str)> {
        repo_full_name
            .split_once('/')
            .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty())
            .ok_or_else(|| AppError::GitHubApi(format!("Invalid repo name: {repo_full_name}")))
    }
}

#[async_trait]
impl RepositoryHost for GitHubPlatform {
    async fn search_repositories(&self, query: &str, per_page: u8) -> Result<Vec<RepositorySummary>> {
        let params = SearchParams {
            q: query,
            sort: "stars",
            order: "desc",
            per_page,
        };

        let response: SearchResponse = self
            .reads
            .get("/search/repositories", Some(&params))
            .await?;

        Ok(response
            .items
            .into_iter()
            .take(usize::from(per_page))
            .map(mapper::map_repository)
            .collect())
    }

    async fn create_issue(
        &self,
        repo_full_name: &str,
        title: &str,
        body: &str,
    ) -> Result<CreatedIssue> {
        let (owner, repo) = Self::parse_repo(repo_full_name)?;

        // Status is read before decoding so that non-JSON rejections keep it
        let url = format!("{}/repos/{owner}/{repo}/issues", self.api_url);
        let response = self
            .writes
            ._post(url, Some(&CreateIssueBody { title, body }))
            .await?;

        let status = response.status();
        let text = self.writes.body_to_string(response).await?;
        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v["message"].as_str().map(str::to_string))
                .unwrap_or(text);
            return Err(AppError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let created: IssueResponse = serde_json::from_str(&text)?;
        Ok(mapper::map_issue(created))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> GitHubConfig {
        GitHubConfig {
            token: "ghp_test".to_string(),
            message: OutreachMessage::issue("Title", "Body"),
            query: "meeting transcription summarization".to_string(),
            max_repos: 5,
            api_url: server.uri(),
        }
    }

    fn platform_for(server: &MockServer) -> GitHubPlatform {
        platform_with_timeout(server, Duration::from_secs(5))
    }

    fn platform_with_timeout(server: &MockServer, timeout: Duration) -> GitHubPlatform {
        let http = HttpConfig {
            timeout,
            write_delay: Duration::ZERO,
        };
        GitHubPlatform::new(&config_for(server), &http).unwrap()
    }

    #[tokio::test]
    async fn test_search_sends_query_sorted_by_stars() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/repositories"))
            .and(query_param("q", "meeting transcription summarization"))
            .and(query_param("sort", "stars"))
            .and(query_param("order", "desc"))
            .and(query_param("per_page", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "total_count": 2,
                "incomplete_results": false,
                "items": [
                    { "full_name": "a/one", "stargazers_count": 900, "description": "first" },
                    { "full_name": "b/two", "stargazers_count": 12, "description": null }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let platform = platform_for(&server);
        let repos = platform
            .search_repositories("meeting transcription summarization", 5)
            .await
            .unwrap();

        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].full_name, "a/one");
        assert_eq!(repos[0].stars, 900);
        assert_eq!(repos[1].description, "");
    }

    #[tokio::test]
    async fn test_search_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/repositories"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "message": "Bad credentials",
                "documentation_url": "https://docs.github.com/rest"
            })))
            .mount(&server)
            .await;

        let platform = platform_for(&server);
        let err = platform.search_repositories("q", 5).await.unwrap_err();
        assert_eq!(err.status_code(), Some(401));
    }

    #[tokio::test]
    async fn test_create_issue_posts_title_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/octo/transcriber/issues"))
            .and(body_json(serde_json::json!({ "title": "Title", "body": "Body" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "number": 7,
                "html_url": "https://github.com/octo/transcriber/issues/7"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let platform = platform_for(&server);
        let issue = platform
            .create_issue("octo/transcriber", "Title", "Body")
            .await
            .unwrap();
        assert_eq!(issue.number, 7);
    }

    #[tokio::test]
    async fn test_create_issue_rejection_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/octo/archived/issues"))
            .respond_with(ResponseTemplate::new(410).set_body_json(serde_json::json!({
                "message": "Issues are disabled for this repo",
                "documentation_url": "https://docs.github.com/rest/issues/issues#create-an-issue"
            })))
            .mount(&server)
            .await;

        let platform = platform_for(&server);
        let err = platform
            .create_issue("octo/archived", "Title", "Body")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(410));
        assert!(err.to_string().contains("Issues are disabled"));
    }

    #[test]
    fn test_parse_repo_rejects_bare_names() {
        assert!(GitHubPlatform::parse_repo("octocat").is_err());
        assert_eq!(GitHubPlatform::parse_repo("o/r").unwrap(), ("o", "r"));
    }

    #[tokio::test]
    async fn test_create_issue_is_sent_once_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/octo/flaky/issues"))
            .respond_with(ResponseTemplate::new(502).set_body_json(serde_json::json!({
                "message": "Server Error"
            })))
            .mount(&server)
            .await;

        let platform = platform_for(&server);
        let err = platform
            .create_issue("octo/flaky", "Title", "Body")
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), Some(502));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_issue_html_rejection_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/octo/blocked/issues"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("content-type", "text/html")
                    .set_body_string("<html>blocked</html>"),
            )
            .mount(&server)
            .await;

        let platform = platform_for(&server);
        let err = platform
            .create_issue("octo/blocked", "Title", "Body")
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), Some(403));
        assert!(err.to_string().contains("<html>blocked</html>"));
    }

    #[tokio::test]
    async fn test_create_issue_gives_up_after_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/octo/slow/issues"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_delay(Duration::from_secs(3))
                    .set_body_json(serde_json::json!({
                        "number": 1,
                        "html_url": "https://github.com/octo/slow/issues/1"
                    })),
            )
            .mount(&server)
            .await;

        let platform = platform_with_timeout(&server, Duration::from_millis(200));
        let result = platform.create_issue("octo/slow", "Title", "Body").await;

        assert!(result.is_err());
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }
}
