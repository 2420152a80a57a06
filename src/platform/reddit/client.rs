use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder, header};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::debug;

use crate::platform::{InboxMessage, MessagingPlatform, PlatformResult};

use super::{
    config::RedditConfig,
    error::{RedditError, RedditResult},
    models::{CommentResponse, Listing, TokenResponse},
};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE_URL: &str = "https://oauth.reddit.com";
const UNREAD_PATH: &str = "message/unread";
const READ_MESSAGE_PATH: &str = "api/read_message";
const COMMENT_PATH: &str = "api/comment";
const PAGE_SIZE: &str = "100";
/// Reddit caps how many fullnames a single `read_message` call accepts.
const READ_BATCH: usize = 100;
/// Refresh the token this long before Reddit would expire it.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct AccessToken {
    value: Arc<str>,
    expires_at: Instant,
}

/// Reddit inbox client authenticating with the password grant of a script app.
#[derive(Clone)]
pub struct RedditClient {
    client: Client,
    config: Arc<RedditConfig>,
    token: Arc<Mutex<Option<AccessToken>>>,
}

impl RedditClient {
    /// Build the HTTP client and obtain a first access token.
    pub async fn connect(config: RedditConfig) -> RedditResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|source| RedditError::ClientBuilder { source })?;

        let reddit = Self {
            client,
            config: Arc::new(config),
            token: Arc::new(Mutex::new(None)),
        };
        reddit.access_token().await?;
        Ok(reddit)
    }

    /// Return a valid bearer token, requesting a new one when it is about to expire.
    async fn access_token(&self) -> RedditResult<Arc<str>> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref().filter(|token| token.expires_at > Instant::now()) {
            return Ok(token.value.clone());
        }

        let response = self
            .client
            .post(TOKEN_URL)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", self.config.username.as_str()),
                ("password", self.config.password.as_str()),
            ])
            .send()
            .await
            .map_err(|source| RedditError::Authenticate { source })?;

        if !response.status().is_success() {
            return Err(RedditError::AuthenticateStatus {
                status: response.status(),
            });
        }

        let payload = response
            .json::<TokenResponse>()
            .await
            .map_err(|source| RedditError::Authenticate { source })?;

        let lifetime = Duration::from_secs(payload.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        let token = AccessToken {
            value: Arc::from(payload.access_token),
            expires_at: Instant::now() + lifetime,
        };
        debug!(expires_in = payload.expires_in, "obtained Reddit access token");
        let value = token.value.clone();
        *guard = Some(token);
        Ok(value)
    }

    async fn request(&self, method: Method, path: &str) -> RedditResult<RequestBuilder> {
        let token = self.access_token().await?;
        let url = format!("{API_BASE_URL}/{path}");
        Ok(self
            .client
            .request(method, url)
            .header(header::AUTHORIZATION, format!("bearer {token}")))
    }

    async fn send_json<T>(&self, path: &str, builder: RequestBuilder) -> RedditResult<T>
    where
        T: DeserializeOwned,
    {
        let response = builder
            .send()
            .await
            .map_err(|source| RedditError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(RedditError::RequestStatus {
                path: path.to_string(),
                status: response.status(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| RedditError::DecodeResponse {
                path: path.to_string(),
                source,
            })
    }

    async fn unread(&self) -> RedditResult<Vec<InboxMessage>> {
        let mut messages = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut query = vec![("limit", PAGE_SIZE.to_string())];
            if let Some(cursor) = after.take() {
                query.push(("after", cursor));
            }

            let builder = self.request(Method::GET, UNREAD_PATH).await?.query(&query);
            let listing: Listing = self.send_json(UNREAD_PATH, builder).await?;
            messages.extend(listing.data.children.into_iter().map(|thing| thing.data.into()));

            match listing.data.after {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }

        Ok(messages)
    }

    async fn read(&self, messages: &[InboxMessage]) -> RedditResult<()> {
        for batch in messages.chunks(READ_BATCH) {
            let ids = batch
                .iter()
                .map(|message| message.id.as_str())
                .collect::<Vec<_>>()
                .join(",");

            let builder = self
                .request(Method::POST, READ_MESSAGE_PATH)
                .await?
                .form(&[("id", ids)]);
            let response = builder
                .send()
                .await
                .map_err(|source| RedditError::RequestSend {
                    path: READ_MESSAGE_PATH.to_string(),
                    source,
                })?;

            if !response.status().is_success() {
                return Err(RedditError::RequestStatus {
                    path: READ_MESSAGE_PATH.to_string(),
                    status: response.status(),
                });
            }
        }
        Ok(())
    }

    async fn comment(&self, message: &InboxMessage, text: &str) -> RedditResult<()> {
        let builder = self.request(Method::POST, COMMENT_PATH).await?.form(&[
            ("api_type", "json"),
            ("thing_id", message.id.as_str()),
            ("text", text),
        ]);
        let response: CommentResponse = self.send_json(COMMENT_PATH, builder).await?;

        if response.json.errors.is_empty() {
            Ok(())
        } else {
            Err(RedditError::Api {
                path: COMMENT_PATH.to_string(),
                errors: serde_json::Value::Array(response.json.errors).to_string(),
            })
        }
    }
}

impl MessagingPlatform for RedditClient {
    fn fetch_unread(&self) -> BoxFuture<'_, PlatformResult<Vec<InboxMessage>>> {
        Box::pin(async move { self.unread().await.map_err(Into::into) })
    }

    fn mark_read<'a>(&'a self, messages: &'a [InboxMessage]) -> BoxFuture<'a, PlatformResult<()>> {
        Box::pin(async move {
            if messages.is_empty() {
                return Ok(());
            }
            self.read(messages).await.map_err(Into::into)
        })
    }

    fn reply<'a>(
        &'a self,
        message: &'a InboxMessage,
        text: &'a str,
    ) -> BoxFuture<'a, PlatformResult<()>> {
        Box::pin(async move { self.comment(message, text).await.map_err(Into::into) })
    }
}
