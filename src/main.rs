use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use outreach::config::Settings;
use outreach::platform::github::GitHubPlatform;
use outreach::platform::reddit::RedditPlatform;
use outreach::summarizer::{SummarizeRequest, SummarizerClient, SAMPLE_TRANSCRIPT};
use outreach::workflow;
use outreach::workflow::types::RunOptions;

#[derive(Parser)]
#[command(
    name = "outreach",
    about = "Share the Meeting Summarization API with related GitHub and Reddit projects"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search GitHub repositories and open an issue on each result
    Github {
        /// List the repositories that would be contacted without opening issues
        #[arg(long)]
        dry_run: bool,

        /// Override the search query
        #[arg(long)]
        query: Option<String>,

        /// Override the number of repositories to contact (1-100)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
        max_repos: Option<u8>,
    },
    /// Reply to recent Reddit posts whose titles mention a keyword
    Reddit {
        /// List the posts that would be answered without commenting
        #[arg(long)]
        dry_run: bool,

        /// Override how many of the newest posts to read per subreddit (1-100)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
        limit: Option<u32>,
    },
    /// Summarize a transcript with the Meeting Summarization API
    Summarize {
        /// Transcript text
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// Read the transcript from a file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Fraction of the transcript to keep
        #[arg(long)]
        ratio: Option<f64>,

        /// Cap on summary sentences, used instead of the ratio
        #[arg(long)]
        max_sentences: Option<u32>,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_json);

    let settings = Settings::load(cli.config.as_deref())?;
    let http = settings.http();

    match cli.command {
        Command::Github {
            dry_run,
            query,
            max_repos,
        } => {
            let mut config = settings.github()?;
            if let Some(query) = query {
                config.query = query;
            }
            if let Some(max_repos) = max_repos {
                config.max_repos = max_repos;
            }

            let platform = GitHubPlatform::new(&config, &http)?;
            let options = RunOptions {
                dry_run,
                write_delay: http.write_delay,
            };
            workflow::github::run(&platform, &config, &options).await?;
        }
        Command::Reddit { dry_run, limit } => {
            let mut config = settings.reddit()?;
            if let Some(limit) = limit {
                config.post_limit = limit;
            }

            let platform = RedditPlatform::new(&config, &http)?;
            let options = RunOptions {
                dry_run,
                write_delay: http.write_delay,
            };
            workflow::reddit::run(&platform, &config, &options).await?;
        }
        Command::Summarize {
            text,
            file,
            ratio,
            max_sentences,
        } => {
            let config = settings.summarizer()?;

            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => tokio::fs::read_to_string(&path).await.map_err(|e| {
                    anyhow::anyhow!("Failed to read transcript {}: {e}", path.display())
                })?,
                (None, None) => SAMPLE_TRANSCRIPT.to_string(),
            };

            let ratio = ratio.unwrap_or(config.ratio);
            if !(ratio > 0.0 && ratio <= 1.0) {
                anyhow::bail!("--ratio must be in (0, 1], got {ratio}");
            }

            let request = SummarizeRequest::new(
                text,
                ratio,
                max_sentences.or(config.max_sentences),
            );

            let client = SummarizerClient::new(&config, &http)?;
            let mut stdout = std::io::stdout().lock();
            workflow::summarize::run(&client, &request, &mut stdout).await?;
        }
    }

    Ok(())
}
