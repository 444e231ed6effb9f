//! Streaming chat over the SSE endpoint.
//!
//! Two surfaces over the same decode loop:
//! [`ApiClient::chat_stream`] returns a `Stream` of [`ChatDelta`]s, and
//! [`ApiClient::stream_chat`] drives that stream and hands each delta to a
//! callback, resolving once the backend signals completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::{Stream, StreamExt};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tokio::sync::Notify;

use crate::client::{ApiClient, ClientError};
use crate::http::add_extra_headers;
use crate::model::{ChatDelta, ChatRequest, StreamFrame};
use crate::sse::SseResponseExt;

const STREAM_PATH: &str = "/ai/chat/stream";

/// Cooperative cancellation handle for an in-flight streaming call.
///
/// Cloning shares the handle; `cancel` is idempotent and wakes every call
/// currently waiting on the token. The cancelled call drops its response
/// body, which releases the underlying connection exactly once.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    inner: Arc<CancelState>,
}

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call any number of times, before,
    /// during, or after the stream it guards completes.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve once cancellation has been requested.
    pub async fn cancelled(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // Register before the flag check so a concurrent cancel cannot
        // slip between check and await.
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

impl ApiClient {
    /// Open the streaming chat endpoint and return the decoded stream of
    /// text deltas.
    ///
    /// The bearer token is read from the [`Authenticator`] once, at call
    /// start. A non-success HTTP status fails with
    /// [`ClientError::Transport`] before any delta is produced; a success
    /// response that carries a buffered JSON body instead of an event
    /// stream fails with [`ClientError::StreamUnavailable`]. Malformed
    /// frames are logged and skipped, frames without text are skipped
    /// silently.
    ///
    /// [`Authenticator`]: crate::client::Authenticator
    pub async fn chat_stream(
        &self,
        request: &ChatRequest,
    ) -> Result<impl Stream<Item = Result<ChatDelta, ClientError>> + Send, ClientError> {
        if request.message.is_empty() {
            return Err(ClientError::InvalidRequest("message must not be empty"));
        }

        // Token is resolved once here, never re-read mid-stream. The
        // header is always present; an empty value lets the backend
        // reject unauthenticated calls itself.
        let bearer = match self.auth().bearer_token().await {
            Some(token) => format!("Bearer {}", token.expose_secret()),
            None => String::new(),
        };

        let mut req = self
            .http()
            .post(self.options().endpoint(STREAM_PATH))
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, bearer)
            .json(request);
        req = add_extra_headers(req, &self.options().extra_headers);

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Transport {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        // A plain JSON content type means the backend answered with a
        // buffered envelope, not an event stream.
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if content_type.starts_with("application/json") {
            return Err(ClientError::StreamUnavailable);
        }

        Ok(response.sse().filter_map(|result| async move {
            match result {
                Ok(payload) => match serde_json::from_str::<StreamFrame>(&payload) {
                    Ok(frame) => frame.text().map(|text| {
                        Ok(ChatDelta {
                            content: text.to_string(),
                            conversation_id: frame.conversation_id.clone(),
                        })
                    }),
                    Err(err) => {
                        // A single bad frame must not abort the stream.
                        tracing::warn!(error = %err, line = %payload, "skipping malformed stream frame");
                        None
                    }
                },
                Err(err) => Some(Err(err)),
            }
        }))
    }

    /// Stream a chat completion, invoking `on_chunk` for every text delta
    /// in arrival order and `on_done` exactly once after the last delta,
    /// whether the backend signalled `[DONE]` or simply closed the stream.
    ///
    /// # Example
    /// ```no_run
    /// # use std::sync::Arc;
    /// # use paperchat::client::{ApiClient, StaticToken};
    /// # use paperchat::model::ChatRequest;
    /// # use paperchat::options::ClientOptions;
    /// # async fn run() -> Result<(), paperchat::client::ClientError> {
    /// # let client = ApiClient::new(
    /// #     ClientOptions::new("http://localhost:8069".into()),
    /// #     Arc::new(StaticToken::anonymous()),
    /// # )?;
    /// client
    ///     .stream_chat(
    ///         &ChatRequest::new("Summarize this paper"),
    ///         |content, _conversation_id| print!("{content}"),
    ///         || println!(),
    ///     )
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn stream_chat<C, D>(
        &self,
        request: &ChatRequest,
        mut on_chunk: C,
        on_done: D,
    ) -> Result<(), ClientError>
    where
        C: FnMut(&str, Option<&str>),
        D: FnOnce(),
    {
        let deltas = self.chat_stream(request).await?;
        let mut deltas = Box::pin(deltas);
        while let Some(delta) = deltas.next().await {
            let delta = delta?;
            on_chunk(&delta.content, delta.conversation_id.as_deref());
        }
        on_done();
        Ok(())
    }

    /// Like [`stream_chat`](Self::stream_chat), but abandons the stream as
    /// soon as `cancel` fires, returning [`ClientError::StreamCancelled`].
    /// The response body is dropped on every exit path, so the connection
    /// is released exactly once even when cancellation races completion.
    pub async fn stream_chat_with_cancel<C, D>(
        &self,
        request: &ChatRequest,
        cancel: &CancelToken,
        mut on_chunk: C,
        on_done: D,
    ) -> Result<(), ClientError>
    where
        C: FnMut(&str, Option<&str>),
        D: FnOnce(),
    {
        if cancel.is_cancelled() {
            return Err(ClientError::StreamCancelled);
        }

        let deltas = self.chat_stream(request).await?;
        let mut deltas = Box::pin(deltas);
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ClientError::StreamCancelled),
                next = deltas.next() => match next {
                    Some(delta) => {
                        let delta = delta?;
                        on_chunk(&delta.content, delta.conversation_id.as_deref());
                    }
                    None => break,
                },
            }
        }
        on_done();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn cancelled_resolves_immediately_after_cancel() {
        let token = CancelToken::new();
        token.cancel();
        token.cancelled().await;
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let token = CancelToken::new();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_wakes_waiting_task() {
        let token = CancelToken::new();
        let waiter = {
            let token = token.clone();
            tokio::spawn(async move { token.cancelled().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake after cancel")
            .unwrap();
    }
}
