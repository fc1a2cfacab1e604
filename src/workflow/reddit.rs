use std::collections::HashSet;

use crate::config::RedditConfig;
use crate::error::Result;
use crate::platform::Community;
use crate::workflow::filter::matching_keyword;
use crate::workflow::types::{ActionOutcome, RunOptions, Tally};

/// Reply to every recent post whose title mentions one of the keywords.
///
/// Login failure aborts the run before any subreddit is read. A subreddit
/// that cannot be listed is skipped, and a failed reply is recorded without
/// stopping the loop. Each post is replied to at most once per run.
pub async fn run(
    community: &dyn Community,
    config: &RedditConfig,
    options: &RunOptions,
) -> Result<Vec<ActionOutcome>> {
    community.authenticate().await?;

    tracing::info!(subreddits = %config.subreddits.join(", "), "Monitoring subreddits");

    let mut seen: HashSet<String> = HashSet::new();
    let mut outcomes = Vec::new();

    for subreddit in &config.subreddits {
        tracing::info!(subreddit = %subreddit, limit = config.post_limit, "Searching for posts");

        let posts = match community.newest_posts(subreddit, config.post_limit).await {
            Ok(posts) => posts,
            Err(e) => {
                tracing::warn!(subreddit = %subreddit, error = %e, "Failed to list posts, skipping subreddit");
                continue;
            }
        };

        for post in posts {
            let Some(keyword) = matching_keyword(&post.title, &config.keywords) else {
                continue;
            };

            if !seen.insert(post.fullname.clone()) {
                tracing::debug!(post_id = %post.id, "Already handled this post in this run");
                continue;
            }

            tracing::info!(
                post_id = %post.id,
                title = %post.title,
                keyword = keyword,
                posted_at = ?post.created_at,
                "Found matching post"
            );

            if options.dry_run {
                tracing::info!(post_id = %post.id, "Dry run, not commenting");
                outcomes.push(ActionOutcome::skipped(post.id, "dry run"));
                continue;
            }

            if outcomes.iter().any(ActionOutcome::was_attempted) && !options.write_delay.is_zero() {
                tokio::time::sleep(options.write_delay).await;
            }

            let outcome = match community.reply(&post, &config.comment.body).await {
                Ok(comment) => {
                    tracing::info!(
                        post_id = %post.id,
                        permalink = %post.permalink,
                        comment_id = ?comment.id,
                        comment_permalink = ?comment.permalink,
                        "Commented on post"
                    );
                    ActionOutcome::succeeded(post.id, comment.permalink.unwrap_or(post.permalink))
                }
                Err(e) => {
                    tracing::warn!(
                        post_id = %post.id,
                        status = ?e.status_code(),
                        error = %e,
                        "Failed to comment on post"
                    );
                    ActionOutcome::failed(post.id, &e)
                }
            };
            outcomes.push(outcome);
        }
    }

    let tally = Tally::of(&outcomes);
    tracing::info!(
        commented = tally.succeeded,
        failed = tally.failed,
        skipped = tally.skipped,
        "Reddit outreach finished"
    );
    for outcome in &outcomes {
        tracing::debug!(outcome = %outcome, "Outreach result");
    }

    Ok(outcomes)
}
