mod client;
mod config;
mod error;
mod models;

pub use client::RedditClient;
pub use config::RedditConfig;
