pub mod github;
pub mod reddit;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;
use types::*;

/// A code host that can be searched for repositories and receive issues.
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Search repositories, most-starred first, returning at most `per_page` results.
    async fn search_repositories(&self, query: &str, per_page: u8) -> Result<Vec<RepositorySummary>>;

    /// Open an issue on `owner/name`.
    async fn create_issue(
        &self,
        repo_full_name: &str,
        title: &str,
        body: &str,
    ) -> Result<CreatedIssue>;
}

/// A discussion site organized into communities of posts.
#[async_trait]
pub trait Community: Send + Sync {
    /// Log in. Must succeed before any other call.
    async fn authenticate(&self) -> Result<()>;

    /// The newest `limit` posts of a subreddit, newest first.
    async fn newest_posts(&self, subreddit: &str, limit: u32) -> Result<Vec<Post>>;

    /// Reply to a post with a markdown comment.
    async fn reply(&self, post: &Post, body: &str) -> Result<CreatedComment>;
}
