mod client;

pub use client::{SummarizeReply, SummarizeRequest, SummarizeResponse, SummarizerClient};

/// Transcript used when none is given on the command line.
pub const SAMPLE_TRANSCRIPT: &str = "In today's meeting we reviewed quarterly sales numbers, \
discussed the upcoming product launch and assigned follow-up tasks to the marketing and \
engineering teams.";
