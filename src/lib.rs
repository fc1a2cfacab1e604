pub mod config;
pub mod error;
pub mod platform;
pub mod summarizer;
pub mod workflow;
