use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    #[error("Reddit API error: {0}")]
    RedditApi(String),

    #[error("Summarizer API error: {0}")]
    SummarizerApi(String),

    /// The remote accepted the request but refused the write.
    #[error("Request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP middleware error: {0}")]
    HttpMiddleware(#[from] reqwest_middleware::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// HTTP status associated with the failure, when the remote produced one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            AppError::Rejected { status, .. } => Some(*status),
            AppError::Http(e) => e.status().map(|s| s.as_u16()),
            AppError::HttpMiddleware(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<octocrab::Error> for AppError {
    fn from(e: octocrab::Error) -> Self {
        match e {
            octocrab::Error::GitHub { source, .. } => AppError::Rejected {
                status: source.status_code.as_u16(),
                message: source.message.clone(),
            },
            other => AppError::GitHubApi(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
