//! # paperchat - Document & Knowledge-Base AI Chat Client
//!
//! Async Rust client for a SmartPaper-style document/knowledge-base AI
//! chat backend: typed wrappers for its authenticated REST endpoints and a
//! streaming chat client over Server-Sent Events.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - Incremental SSE decoding: constant memory, first token as soon as it
//!   arrives, chunk-boundary independent
//! - Injected credential provider instead of global token state
//! - Cooperative cancellation of in-flight streams
//! - Typed request/response models with the backend's response envelope
//!   unwrapped for you
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use paperchat::client::{ApiClient, TokenStore};
//! use paperchat::api::auth::LoginRequest;
//! use paperchat::model::ChatRequest;
//! use paperchat::options::ClientOptions;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tokens = TokenStore::new();
//!     let client = ApiClient::new(
//!         ClientOptions::new("http://localhost:8069".to_string()),
//!         tokens.clone(),
//!     )?;
//!
//!     let session = client.login(&LoginRequest::new("alice", "secret")).await?;
//!     tokens.set(session.token);
//!
//!     client
//!         .stream_chat(
//!             &ChatRequest::new("What does this paper conclude?"),
//!             |content, _conversation_id| print!("{content}"),
//!             || println!(),
//!         )
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod http;
pub mod model;
pub mod options;
pub mod sse;
pub mod stream;

// Re-exports for convenience
pub use client::{ApiClient, Authenticator, ClientError, StaticToken, TokenStore};
pub use model::{ChatDelta, ChatMessage, ChatRequest, StreamFrame};
pub use options::{ClientOptions, SecretString};
pub use stream::CancelToken;
