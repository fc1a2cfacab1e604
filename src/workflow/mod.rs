pub mod filter;
pub mod github;
pub mod reddit;
pub mod summarize;
pub mod types;
