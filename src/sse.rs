//! Server-Sent Events (SSE) stream decoding.
//!
//! The streaming chat endpoint frames its output as SSE data lines:
//!
//! ```text
//! data: {"delta":"Hel","conversationId":"c-1"}
//!
//! data: {"delta":"lo"}
//!
//! data: [DONE]
//! ```
//!
//! Transport chunk boundaries carry no meaning: a chunk may end in the
//! middle of a line or even in the middle of a multi-byte character. The
//! decoder therefore buffers raw bytes and only extracts fully terminated
//! lines; everything after the last `\n` stays in the buffer until more
//! bytes arrive.

use std::collections::VecDeque;

use bytes::{Bytes, BytesMut};
use futures::stream::{self, Stream, StreamExt};

use crate::client::ClientError;

/// Payload marking normal end of stream.
const DONE_MARKER: &str = "[DONE]";

/// Extract the payload of an SSE data line.
///
/// Returns the trimmed content after the `data:` marker, or `None` for any
/// other line (event/id/comment lines, blank separators).
///
/// # Example
/// ```
/// use paperchat::sse::data_payload;
///
/// assert_eq!(data_payload("data: {\"delta\":\"hi\"}"), Some("{\"delta\":\"hi\"}"));
/// assert_eq!(data_payload("event: ping"), None);
/// ```
pub fn data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim)
}

/// Check whether a data payload is the end-of-stream sentinel.
pub fn is_done_marker(payload: &str) -> bool {
    payload == DONE_MARKER
}

/// Incremental line decoder over an SSE byte stream.
///
/// Feed transport chunks in arrival order; each call returns the data
/// payloads of every line the chunk completed. The internal buffer holds at
/// most the one unterminated trailing line. Splitting happens on raw bytes,
/// so a UTF-8 sequence broken across chunks reassembles before any text
/// decoding — `\n` can never occur inside a multi-byte sequence, so a
/// complete line is always whole.
#[derive(Debug, Default)]
pub struct SseLineDecoder {
    buf: BytesMut,
    done: bool,
}

impl SseLineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the `[DONE]` sentinel has been seen; later input is
    /// discarded.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Append a chunk and return the data payloads of all newly completed
    /// lines, in order. Stops at the `[DONE]` sentinel.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut payloads = Vec::new();
        if self.done {
            return payloads;
        }
        self.buf.extend_from_slice(chunk);

        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line = self.buf.split_to(pos + 1);
            let line = &line[..line.len() - 1];
            let line = match std::str::from_utf8(line) {
                Ok(s) => s,
                Err(err) => {
                    tracing::warn!(%err, "skipping non-UTF-8 stream line");
                    continue;
                }
            };
            let Some(payload) = data_payload(line) else {
                continue;
            };
            if is_done_marker(payload) {
                self.done = true;
                self.buf.clear();
                break;
            }
            payloads.push(payload.to_string());
        }
        payloads
    }
}

/// Decode a byte stream into a stream of SSE data payloads.
///
/// Ends at the `[DONE]` sentinel or at end of input, whichever comes first;
/// an unterminated trailing line at end of input is discarded with the
/// buffer. Transport errors surface as stream items.
pub fn sse_data_stream<S, E>(
    byte_stream: S,
) -> impl Stream<Item = Result<String, ClientError>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<ClientError> + Send + 'static,
{
    stream::unfold(
        (
            Box::pin(byte_stream),
            SseLineDecoder::new(),
            VecDeque::new(),
            false,
        ),
        |(mut bytes, mut decoder, mut pending, mut ended)| async move {
            loop {
                if let Some(payload) = pending.pop_front() {
                    return Some((Ok(payload), (bytes, decoder, pending, ended)));
                }
                if decoder.is_done() || ended {
                    return None;
                }
                match bytes.next().await {
                    Some(Ok(chunk)) => pending.extend(decoder.feed(&chunk)),
                    Some(Err(err)) => {
                        return Some((Err(err.into()), (bytes, decoder, pending, ended)));
                    }
                    None => ended = true,
                }
            }
        },
    )
}

/// Extension trait turning a `reqwest::Response` into an SSE payload stream.
pub trait SseResponseExt {
    /// Stream of decoded `data:` payloads from the response body.
    fn sse(self) -> impl Stream<Item = Result<String, ClientError>> + Send;
}

impl SseResponseExt for reqwest::Response {
    fn sse(self) -> impl Stream<Item = Result<String, ClientError>> + Send {
        sse_data_stream(self.bytes_stream())
    }
}
