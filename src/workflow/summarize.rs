use std::io::Write;

use crate::error::Result;
use crate::summarizer::{SummarizeReply, SummarizeRequest, SummarizerClient};

/// Send one transcript and print what came back.
pub async fn run(
    client: &SummarizerClient,
    request: &SummarizeRequest,
    out: &mut impl Write,
) -> Result<SummarizeReply> {
    tracing::info!(
        chars = request.text.chars().count(),
        ratio = ?request.ratio,
        max_sentences = ?request.max_sentences,
        "Requesting summary"
    );

    let reply = client.summarize(request).await?;
    render(&reply, out)?;
    Ok(reply)
}

pub fn render(reply: &SummarizeReply, out: &mut impl Write) -> std::io::Result<()> {
    match reply {
        SummarizeReply::Summary(response) => {
            writeln!(out, "Summary:")?;
            writeln!(
                out,
                "{}",
                response.summary.as_deref().unwrap_or("No summary returned.")
            )?;
            writeln!(out)?;
            writeln!(out, "Action Items:")?;
            for (idx, item) in response.action_items.iter().enumerate() {
                writeln!(out, "{}. {item}", idx + 1)?;
            }
        }
        SummarizeReply::Failed { status, body } => {
            writeln!(out, "Request failed with status {status}")?;
            writeln!(out, "{body}")?;
        }
    }
    Ok(())
}
