use std::{future::Future, sync::Arc};

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

/// Shortest secret word handed out to players.
pub const DEFAULT_MIN_WORD_LEN: usize = 4;

/// The word generator could not supply a word. Every variant is fatal to the
/// call that asked for it; callers must not retry on their own.
#[derive(Debug, Error)]
pub enum WordSourceError {
    /// The request could not be sent or the connection failed.
    #[error("failed to reach word generator at `{url}`")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The generator answered with a non-success status.
    #[error("word generator returned status {status}")]
    Status { status: StatusCode },
    /// The response body was not a JSON array of words.
    #[error("failed to decode word generator response")]
    Decode {
        #[source]
        source: reqwest::Error,
    },
    /// The generator answered with an empty list.
    #[error("word generator returned no words")]
    Empty,
}

/// Supplies secret words for new games.
pub trait WordSource: Send + Sync {
    /// Fetch one word at least as long as the source's minimum length.
    fn fetch_secret_word(&self) -> BoxFuture<'_, Result<String, WordSourceError>>;
}

/// Keep requesting candidates until one has at least `min_len` characters.
///
/// Short words are a filter, not a failure, so they are retried without limit.
/// Transport errors are returned as soon as they occur.
pub async fn first_long_enough<F, Fut>(
    min_len: usize,
    mut fetch_candidate: F,
) -> Result<String, WordSourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, WordSourceError>>,
{
    loop {
        let candidate = fetch_candidate().await?;
        let len = candidate.chars().count();
        if len >= min_len {
            return Ok(candidate);
        }
        debug!(len, min_len, "candidate word too short; requesting another");
    }
}

/// Word source backed by an HTTP random word API.
///
/// The endpoint is called as `GET <url>?number=1` and must answer with a JSON
/// array of strings.
#[derive(Debug, Clone)]
pub struct HttpWordSource {
    client: Client,
    url: Arc<str>,
    min_len: usize,
}

impl HttpWordSource {
    /// Build a source for `url` using the shared HTTP client.
    pub fn new(client: Client, url: impl Into<String>, min_len: usize) -> Self {
        Self {
            client,
            url: Arc::from(url.into()),
            min_len,
        }
    }

    async fn fetch_candidate(&self) -> Result<String, WordSourceError> {
        let response = self
            .client
            .get(self.url.as_ref())
            .query(&[("number", "1")])
            .send()
            .await
            .map_err(|source| WordSourceError::Request {
                url: self.url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WordSourceError::Status { status });
        }

        let words = response
            .json::<Vec<String>>()
            .await
            .map_err(|source| WordSourceError::Decode { source })?;

        words.into_iter().next().ok_or(WordSourceError::Empty)
    }
}

impl WordSource for HttpWordSource {
    fn fetch_secret_word(&self) -> BoxFuture<'_, Result<String, WordSourceError>> {
        Box::pin(first_long_enough(self.min_len, || self.fetch_candidate()))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{
        collections::VecDeque,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use super::*;

    /// Hands out a fixed list of words, then fails with [`WordSourceError::Empty`].
    pub(crate) struct ScriptedWordSource {
        words: Mutex<VecDeque<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedWordSource {
        pub(crate) fn new<I, S>(words: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                words: Mutex::new(words.into_iter().map(Into::into).collect()),
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl WordSource for ScriptedWordSource {
        fn fetch_secret_word(&self) -> BoxFuture<'_, Result<String, WordSourceError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.words.lock().unwrap().pop_front();
            Box::pin(async move { next.ok_or(WordSourceError::Empty) })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    #[tokio::test]
    async fn skips_candidates_shorter_than_minimum() {
        let mut candidates: VecDeque<Result<String, WordSourceError>> = VecDeque::from([
            Ok("a".to_string()),
            Ok("cat".to_string()),
            Ok("kite".to_string()),
            Ok("lantern".to_string()),
        ]);
        let mut requests = 0;

        let word = first_long_enough(DEFAULT_MIN_WORD_LEN, || {
            requests += 1;
            let next = candidates.pop_front().unwrap();
            async move { next }
        })
        .await
        .unwrap();

        assert_eq!(word, "kite");
        assert_eq!(requests, 3);
    }

    #[tokio::test]
    async fn transport_failure_stops_retrying() {
        let mut candidates: VecDeque<Result<String, WordSourceError>> = VecDeque::from([
            Ok("ox".to_string()),
            Err(WordSourceError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
            }),
            Ok("kite".to_string()),
        ]);

        let err = first_long_enough(DEFAULT_MIN_WORD_LEN, || {
            let next = candidates.pop_front().unwrap();
            async move { next }
        })
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            WordSourceError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE
            }
        ));
        assert_eq!(candidates.len(), 1);
    }
}
