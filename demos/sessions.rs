//! Login and conversation management example.
//!
//! Run with:
//! ```bash
//! export PAPERCHAT_BASE_URL="http://localhost:8069"
//! export PAPERCHAT_USERNAME="alice"
//! export PAPERCHAT_PASSWORD="secret"
//! cargo run --example sessions
//! ```

use paperchat::api::auth::LoginRequest;
use paperchat::client::{ApiClient, TokenStore};
use paperchat::model::ChatRequest;
use paperchat::options::ClientOptions;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base_url =
        std::env::var("PAPERCHAT_BASE_URL").unwrap_or_else(|_| "http://localhost:8069".to_string());
    let username = std::env::var("PAPERCHAT_USERNAME").expect("PAPERCHAT_USERNAME must be set");
    let password = std::env::var("PAPERCHAT_PASSWORD").expect("PAPERCHAT_PASSWORD must be set");

    let tokens = TokenStore::new();
    let client = ApiClient::new(ClientOptions::new(base_url), tokens.clone())?;

    let session = client.login(&LoginRequest::new(username, password)).await?;
    println!("Logged in as {}", session.user_info.username);
    tokens.set(session.token);

    let response = client
        .chat(&ChatRequest::new("What can you help me with?"))
        .await?;
    println!("Assistant: {}", response.ai_response);

    let conversations = client.conversations().await?;
    println!("\n{} conversation(s):", conversations.len());
    for conversation in &conversations {
        println!(
            "  {} - {}",
            conversation.conversation_id,
            conversation.title.as_deref().unwrap_or("(untitled)")
        );
    }

    let history = client.conversation_history(&response.conversation_id).await?;
    println!("\nHistory of {}:", response.conversation_id);
    for message in &history {
        println!("  {:?}: {}", message.role, message.content);
    }

    client.logout().await?;
    tokens.clear();
    println!("\nLogged out.");

    Ok(())
}
