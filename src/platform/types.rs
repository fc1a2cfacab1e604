use chrono::{DateTime, Utc};

/// A repository returned by a GitHub repository search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySummary {
    /// `owner/name`
    pub full_name: String,
    pub stars: u64,
    pub description: String,
}

/// A Reddit submission from a subreddit listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    /// Base-36 id, e.g. `abc123`.
    pub id: String,
    /// Type-prefixed id used as the reply target, e.g. `t3_abc123`.
    pub fullname: String,
    pub title: String,
    pub permalink: String,
    pub subreddit: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Text sent to every matched target during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutreachMessage {
    /// Only issues have a title; comments are body-only.
    pub title: Option<String>,
    /// Markdown.
    pub body: String,
}

impl OutreachMessage {
    pub fn issue(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            body: body.into(),
        }
    }

    pub fn comment(body: impl Into<String>) -> Self {
        Self {
            title: None,
            body: body.into(),
        }
    }
}

/// A comment created by a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedComment {
    pub id: Option<String>,
    pub permalink: Option<String>,
}

/// An issue created on a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedIssue {
    pub number: u64,
    pub html_url: String,
}
