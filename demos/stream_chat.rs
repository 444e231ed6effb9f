//! Streaming chat example.
//!
//! Run with:
//! ```bash
//! export PAPERCHAT_BASE_URL="http://localhost:8069"
//! export PAPERCHAT_TOKEN="your-session-token"
//! cargo run --example stream_chat
//! ```

use std::io::Write;
use std::sync::Arc;

use paperchat::client::{ApiClient, StaticToken};
use paperchat::model::ChatRequest;
use paperchat::options::ClientOptions;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base_url =
        std::env::var("PAPERCHAT_BASE_URL").unwrap_or_else(|_| "http://localhost:8069".to_string());
    let token = std::env::var("PAPERCHAT_TOKEN").ok();

    let auth = match token {
        Some(token) => StaticToken::new(token),
        None => StaticToken::anonymous(),
    };
    let client = ApiClient::new(ClientOptions::new(base_url), Arc::new(auth))?;

    println!("Streaming response...\n");

    client
        .stream_chat(
            &ChatRequest::new("Give me a three-sentence overview of transformer models."),
            |content, conversation_id| {
                if let Some(id) = conversation_id {
                    eprintln!("[conversation {id}]");
                }
                print!("{content}");
                // Flush so text shows up as it arrives
                let _ = std::io::stdout().flush();
            },
            || println!("\n\n=== Stream Complete ==="),
        )
        .await?;

    Ok(())
}
