use super::error::{RedditError, RedditResult};

/// Credentials for a Reddit "script" application acting as the bot account.
#[derive(Debug, Clone)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
}

impl RedditConfig {
    /// Build a configuration by reading the expected environment variables.
    pub fn from_env(user_agent: impl Into<String>) -> RedditResult<Self> {
        Ok(Self {
            client_id: required_var("REDDIT_CLIENT_ID")?,
            client_secret: required_var("REDDIT_CLIENT_SECRET")?,
            username: required_var("REDDIT_USERNAME")?,
            password: required_var("REDDIT_PASSWORD")?,
            user_agent: user_agent.into(),
        })
    }
}

fn required_var(var: &'static str) -> RedditResult<String> {
    std::env::var(var)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or(RedditError::MissingEnvVar { var })
}
