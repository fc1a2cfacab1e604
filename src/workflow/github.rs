use crate::config::GitHubConfig;
use crate::error::Result;
use crate::platform::RepositoryHost;
use crate::workflow::types::{ActionOutcome, RunOptions, Tally};

/// Search for repositories and open the outreach issue on each one.
///
/// A failed search aborts the run. A failed issue is recorded and the next
/// repository is still processed.
pub async fn run(
    host: &dyn RepositoryHost,
    config: &GitHubConfig,
    options: &RunOptions,
) -> Result<Vec<ActionOutcome>> {
    let title = config.message.title.as_deref().unwrap_or_default();
    let body = &config.message.body;

    tracing::info!(query = %config.query, per_page = config.max_repos, "Searching for repositories");

    let repos = host
        .search_repositories(&config.query, config.max_repos)
        .await?;

    if repos.is_empty() {
        tracing::info!("No repositories matched the query");
    }

    let mut outcomes = Vec::with_capacity(repos.len());

    for repo in repos {
        tracing::info!(
            repo = %repo.full_name,
            stars = repo.stars,
            description = %repo.description,
            "Preparing to open issue"
        );

        if options.dry_run {
            tracing::info!(repo = %repo.full_name, "Dry run, not opening issue");
            outcomes.push(ActionOutcome::skipped(repo.full_name, "dry run"));
            continue;
        }

        if outcomes.iter().any(ActionOutcome::was_attempted) && !options.write_delay.is_zero() {
            tokio::time::sleep(options.write_delay).await;
        }

        let outcome = match host.create_issue(&repo.full_name, title, body).await {
            Ok(issue) => {
                tracing::info!(
                    repo = %repo.full_name,
                    number = issue.number,
                    url = %issue.html_url,
                    "Issue created"
                );
                ActionOutcome::succeeded(repo.full_name, format!("#{}", issue.number))
            }
            Err(e) => {
                let outcome = ActionOutcome::failed(repo.full_name, &e);
                tracing::warn!(
                    repo = %outcome.target,
                    status = ?e.status_code(),
                    error = %e,
                    "Failed to create issue"
                );
                outcome
            }
        };
        outcomes.push(outcome);
    }

    let tally = Tally::of(&outcomes);
    tracing::info!(
        created = tally.succeeded,
        failed = tally.failed,
        skipped = tally.skipped,
        "GitHub outreach finished"
    );
    for outcome in &outcomes {
        tracing::debug!(outcome = %outcome, "Outreach result");
    }

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::platform::types::{CreatedIssue, OutreachMessage, RepositorySummary};
    use crate::workflow::types::ActionStatus;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory host: search returns `repos`, issue creation fails with
    /// the mapped status for repos listed in `reject`.
    struct FakeHost {
        repos: Vec<&'static str>,
        reject: Vec<(&'static str, u16)>,
        search_fails: bool,
        searches: Mutex<Vec<(String, u8)>>,
        issues: Mutex<Vec<(String, String, String)>>,
    }

    impl FakeHost {
        fn new(repos: Vec<&'static str>) -> Self {
            Self {
                repos,
                reject: Vec::new(),
                search_fails: false,
                searches: Mutex::new(Vec::new()),
                issues: Mutex::new(Vec::new()),
            }
        }

        fn issue_count(&self) -> usize {
            self.issues.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RepositoryHost for FakeHost {
        async fn search_repositories(
            &self,
            query: &str,
            per_page: u8,
        ) -> Result<Vec<RepositorySummary>> {
            self.searches
                .lock()
                .unwrap()
                .push((query.to_string(), per_page));
            if self.search_fails {
                return Err(AppError::Rejected {
                    status: 401,
                    message: "Bad credentials".to_string(),
                });
            }
            Ok(self
                .repos
                .iter()
                .take(usize::from(per_page))
                .map(|name| RepositorySummary {
                    full_name: name.to_string(),
                    stars: 10,
                    description: "transcribe meetings".to_string(),
                })
                .collect())
        }

        async fn create_issue(
            &self,
            repo_full_name: &str,
            title: &str,
            body: &str,
        ) -> Result<CreatedIssue> {
            self.issues.lock().unwrap().push((
                repo_full_name.to_string(),
                title.to_string(),
                body.to_string(),
            ));
            if let Some((_, status)) = self.reject.iter().find(|(r, _)| *r == repo_full_name) {
                return Err(AppError::Rejected {
                    status: *status,
                    message: "Validation Failed".to_string(),
                });
            }
            Ok(CreatedIssue {
                number: 1,
                html_url: format!("https://github.com/{repo_full_name}/issues/1"),
            })
        }
    }

    fn config() -> GitHubConfig {
        GitHubConfig {
            token: "ghp_test".to_string(),
            message: OutreachMessage::issue("Try the summarization API", "Hello!"),
            query: "meeting transcription summarization".to_string(),
            max_repos: 5,
            api_url: "https://api.github.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mixed_results_continue_past_failures() {
        let mut host = FakeHost::new(vec!["a/one", "b/two", "c/three"]);
        host.reject.push(("b/two", 422));

        let outcomes = run(&host, &config(), &RunOptions::default())
            .await
            .unwrap();

        assert_eq!(host.issue_count(), 3);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes.iter().filter(|o| o.is_success()).count(), 2);
        assert_eq!(outcomes[1].target, "b/two");
        assert!(matches!(
            outcomes[1].status,
            ActionStatus::Failed {
                status_code: Some(422),
                ..
            }
        ));
        assert!(outcomes[2].is_success());
    }

    #[tokio::test]
    async fn test_search_uses_configured_query_and_page_size() {
        let host = FakeHost::new(vec![]);
        run(&host, &config(), &RunOptions::default()).await.unwrap();
        assert_eq!(
            *host.searches.lock().unwrap(),
            vec![("meeting transcription summarization".to_string(), 5)]
        );
    }

    #[tokio::test]
    async fn test_no_results_no_writes() {
        let host = FakeHost::new(vec![]);
        let outcomes = run(&host, &config(), &RunOptions::default())
            .await
            .unwrap();
        assert!(outcomes.is_empty());
        assert_eq!(host.issue_count(), 0);
    }

    #[tokio::test]
    async fn test_at_most_one_issue_per_result() {
        let host = FakeHost::new(vec!["a/1", "a/2", "a/3", "a/4", "a/5", "a/6", "a/7"]);
        let outcomes = run(&host, &config(), &RunOptions::default())
            .await
            .unwrap();
        assert_eq!(outcomes.len(), 5);
        assert_eq!(host.issue_count(), 5);
    }

    #[tokio::test]
    async fn test_issue_uses_configured_message() {
        let host = FakeHost::new(vec!["a/one"]);
        run(&host, &config(), &RunOptions::default()).await.unwrap();
        let issues = host.issues.lock().unwrap();
        assert_eq!(
            issues[0],
            (
                "a/one".to_string(),
                "Try the summarization API".to_string(),
                "Hello!".to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_search_failure_aborts() {
        let mut host = FakeHost::new(vec!["a/one"]);
        host.search_fails = true;
        let result = run(&host, &config(), &RunOptions::default()).await;
        assert!(result.is_err());
        assert_eq!(host.issue_count(), 0);
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let host = FakeHost::new(vec!["a/one", "b/two"]);
        let options = RunOptions {
            dry_run: true,
            ..RunOptions::default()
        };
        let outcomes = run(&host, &config(), &options).await.unwrap();
        assert_eq!(host.issue_count(), 0);
        assert!(outcomes.iter().all(|o| !o.was_attempted()));
    }
}
