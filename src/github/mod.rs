// GitHub API module.
// Provides the client and types for fetching repository listings.

pub mod client;
pub mod fetch;
pub mod types;

pub use client::GitHubClient;
pub use types::{Item, ItemSource};
