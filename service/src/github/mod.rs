// stagecoach_service/src/github/mod.rs

pub mod client;
pub mod event;
pub mod report;
pub mod signature;

pub use client::{CommitState, GithubClient};
pub use event::PullRequestEvent;
