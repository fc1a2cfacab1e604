use serde::{Deserialize, Deserializer};
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::platform::types::OutreachMessage;

const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
const DEFAULT_REDDIT_AUTH_URL: &str = "https://www.reddit.com";
const DEFAULT_REDDIT_API_URL: &str = "https://oauth.reddit.com";
const DEFAULT_SUMMARIZER_HOST: &str = "meeting-summarization-api.p.rapidapi.com";

/// Raw settings as read from the config file and the process environment.
///
/// Keys are flat so that an environment variable such as `GITHUB_TOKEN`
/// lines up with the `github_token` key in `outreach.toml`. Each command
/// turns the part it needs into a validated config with
/// [`Settings::github`], [`Settings::reddit`] or [`Settings::summarizer`].
#[derive(Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
    github_token: Option<String>,
    outreach_title: Option<String>,
    outreach_body: Option<String>,
    github_query: Option<String>,
    github_max_repos: Option<u8>,
    github_api_url: Option<String>,

    reddit_client_id: Option<String>,
    reddit_client_secret: Option<String>,
    reddit_username: Option<String>,
    reddit_password: Option<String>,
    user_agent: Option<String>,
    #[serde(deserialize_with = "de_list")]
    subreddits: Vec<String>,
    #[serde(deserialize_with = "de_list")]
    search_keywords: Vec<String>,
    comment_body: Option<String>,
    reddit_post_limit: Option<u32>,
    reddit_auth_url: Option<String>,
    reddit_api_url: Option<String>,

    rapidapi_key: Option<String>,
    rapidapi_host: Option<String>,
    summarizer_url: Option<String>,
    summarizer_ratio: Option<f64>,
    summarizer_max_sentences: Option<u32>,

    http_timeout_secs: Option<u64>,
    write_delay_ms: Option<u64>,
}

#[derive(Clone)]
pub struct GitHubConfig {
    pub token: String,
    pub message: OutreachMessage,
    pub query: String,
    pub max_repos: u8,
    pub api_url: String,
}

// Manual Debug impl to avoid leaking the token
impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("token", &"[REDACTED]")
            .field("message", &self.message)
            .field("query", &self.query)
            .field("max_repos", &self.max_repos)
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
}

// Manual Debug impl to avoid leaking the client secret and password
impl std::fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct RedditConfig {
    pub credentials: RedditCredentials,
    /// Subreddit names, trimmed and deduplicated in configured order.
    pub subreddits: Vec<String>,
    /// Keywords, trimmed and lowercased.
    pub keywords: Vec<String>,
    pub comment: OutreachMessage,
    pub post_limit: u32,
    pub auth_url: String,
    pub api_url: String,
}

#[derive(Clone)]
pub struct SummarizerConfig {
    pub api_key: String,
    pub host: String,
    pub url: String,
    pub ratio: f64,
    pub max_sentences: Option<u32>,
}

// Manual Debug impl to avoid leaking the API key
impl std::fmt::Debug for SummarizerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummarizerConfig")
            .field("api_key", &"[REDACTED]")
            .field("host", &self.host)
            .field("url", &self.url)
            .field("ratio", &self.ratio)
            .field("max_sentences", &self.max_sentences)
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HttpConfig {
    pub timeout: Duration,
    /// Pause between two consecutive write attempts.
    pub write_delay: Duration,
}

fn default_query() -> String {
    "meeting transcription summarization".to_string()
}

fn default_max_repos() -> u8 {
    5
}

fn default_post_limit() -> u32 {
    50
}

fn default_ratio() -> f64 {
    0.2
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_summarizer_url() -> String {
    format!("https://{DEFAULT_SUMMARIZER_HOST}/summarize")
}

/// Accepts either a comma-separated string or a list of strings.
fn de_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrString {
        List(Vec<String>),
        Joined(String),
    }

    let items = match ListOrString::deserialize(deserializer)? {
        ListOrString::List(items) => items,
        ListOrString::Joined(joined) => joined.split(',').map(str::to_string).collect(),
    };

    Ok(items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}

/// Collects the names of every required setting that is absent or blank.
#[derive(Default)]
struct Required {
    missing: Vec<&'static str>,
}

impl Required {
    fn take(&mut self, name: &'static str, value: &Option<String>) -> String {
        match value.as_deref().filter(|v| !v.trim().is_empty()) {
            Some(v) => v.to_string(),
            None => {
                self.missing.push(name);
                String::new()
            }
        }
    }

    fn take_list(&mut self, name: &'static str, values: &[String]) -> Vec<String> {
        if values.is_empty() {
            self.missing.push(name);
        }
        values.to_vec()
    }

    fn finish(self) -> Result<()> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Config(format!(
                "missing required settings: {}",
                self.missing.join(", ")
            )))
        }
    }
}

fn or_default(value: &Option<String>, default: impl FnOnce() -> String) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(default)
}

impl Settings {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        Self::from_sources(config_path, config::Environment::default())
    }

    fn from_sources(config_path: Option<&str>, environment: config::Environment) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Load from file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            builder = builder.add_source(config::File::with_name("outreach").required(false));
        }

        // Environment variables override the file, e.g. GITHUB_TOKEN -> github_token
        builder = builder.add_source(environment);

        Self::from_builder(builder)
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        let config = builder
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))
    }

    pub fn http(&self) -> HttpConfig {
        HttpConfig {
            timeout: Duration::from_secs(self.http_timeout_secs.unwrap_or_else(default_timeout_secs)),
            write_delay: Duration::from_millis(self.write_delay_ms.unwrap_or(0)),
        }
    }

    pub fn github(&self) -> Result<GitHubConfig> {
        let mut required = Required::default();
        let token = required.take("GITHUB_TOKEN", &self.github_token);
        let title = required.take("OUTREACH_TITLE", &self.outreach_title);
        let body = required.take("OUTREACH_BODY", &self.outreach_body);
        required.finish()?;

        let max_repos = self.github_max_repos.unwrap_or_else(default_max_repos);
        if !(1..=100).contains(&max_repos) {
            return Err(AppError::Config(format!(
                "GITHUB_MAX_REPOS must be between 1 and 100, got {max_repos}"
            )));
        }

        Ok(GitHubConfig {
            token,
            message: OutreachMessage::issue(title, body),
            query: or_default(&self.github_query, default_query),
            max_repos,
            api_url: or_default(&self.github_api_url, || DEFAULT_GITHUB_API_URL.to_string()),
        })
    }

    pub fn reddit(&self) -> Result<RedditConfig> {
        let mut required = Required::default();
        let client_id = required.take("REDDIT_CLIENT_ID", &self.reddit_client_id);
        let client_secret = required.take("REDDIT_CLIENT_SECRET", &self.reddit_client_secret);
        let username = required.take("REDDIT_USERNAME", &self.reddit_username);
        let password = required.take("REDDIT_PASSWORD", &self.reddit_password);
        let user_agent = required.take("USER_AGENT", &self.user_agent);
        let subreddits = required.take_list("SUBREDDITS", &self.subreddits);
        let keywords = required.take_list("SEARCH_KEYWORDS", &self.search_keywords);
        let comment_body = required.take("COMMENT_BODY", &self.comment_body);
        required.finish()?;

        let mut unique_subreddits: Vec<String> = Vec::with_capacity(subreddits.len());
        for name in subreddits {
            if !unique_subreddits
                .iter()
                .any(|seen| seen.eq_ignore_ascii_case(&name))
            {
                unique_subreddits.push(name);
            }
        }

        let post_limit = self.reddit_post_limit.unwrap_or_else(default_post_limit);
        if !(1..=100).contains(&post_limit) {
            return Err(AppError::Config(format!(
                "REDDIT_POST_LIMIT must be between 1 and 100, got {post_limit}"
            )));
        }

        Ok(RedditConfig {
            credentials: RedditCredentials {
                client_id,
                client_secret,
                username,
                password,
                user_agent,
            },
            subreddits: unique_subreddits,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            comment: OutreachMessage::comment(comment_body),
            post_limit,
            auth_url: or_default(&self.reddit_auth_url, || DEFAULT_REDDIT_AUTH_URL.to_string()),
            api_url: or_default(&self.reddit_api_url, || DEFAULT_REDDIT_API_URL.to_string()),
        })
    }

    pub fn summarizer(&self) -> Result<SummarizerConfig> {
        let mut required = Required::default();
        let api_key = required.take("RAPIDAPI_KEY", &self.rapidapi_key);
        required.finish()?;

        let ratio = self.summarizer_ratio.unwrap_or_else(default_ratio);
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(AppError::Config(format!(
                "SUMMARIZER_RATIO must be in (0, 1], got {ratio}"
            )));
        }

        Ok(SummarizerConfig {
            api_key,
            host: or_default(&self.rapidapi_host, || DEFAULT_SUMMARIZER_HOST.to_string()),
            url: or_default(&self.summarizer_url, default_summarizer_url),
            ratio,
            max_sentences: self.summarizer_max_sentences,
        })
    }
}
