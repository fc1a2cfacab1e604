use serde::Deserialize;

use crate::platform::types;

/// `GET /search/repositories` response, trimmed to the fields we use.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<RepositoryItem>,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryItem {
    pub full_name: String,
    #[serde(default)]
    pub stargazers_count: u64,
    pub description: Option<String>,
}

/// `POST /repos/{owner}/{repo}/issues` response.
#[derive(Debug, Deserialize)]
pub struct IssueResponse {
    pub number: u64,
    #[serde(default)]
    pub html_url: String,
}

pub fn map_repository(item: RepositoryItem) -> types::RepositorySummary {
    types::RepositorySummary {
        full_name: item.full_name,
        stars: item.stargazers_count,
        description: item.description.unwrap_or_default(),
    }
}

pub fn map_issue(issue: IssueResponse) -> types::CreatedIssue {
    types::CreatedIssue {
        number: issue.number,
        html_url: issue.html_url,
    }
}
