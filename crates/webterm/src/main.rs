//! # webterm
//!
//! Line-oriented client for remote shells reached through a WebSocket bridge.
//!
//! ## Overview
//!
//! The client provides:
//! - Session management (connect, disconnect, automatic single retry)
//! - Command submission, interrupt and history recall
//! - Prompt-aware transcript rendering
//!
//! ## Architecture
//!
//! This is Layer 3 - the binary that ties together:
//! - webterm-core: Core types, protocol and configuration
//! - webterm-transport: WebSocket channel to the bridge
//! - webterm-detector: Prompt detection and line classification
//! - webterm-session: Session state machine

use anyhow::Context;
use webterm::{App, CliArgs, USAGE};
use webterm_core::ClientConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = CliArgs::parse(std::env::args().skip(1))?;
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }
    if args.version {
        println!("webterm {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ClientConfig::default(),
    };

    // Initialize logging on stderr so the transcript owns stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(
        "webterm v{} starting, endpoint={}",
        env!("CARGO_PKG_VERSION"),
        config.transport.endpoint
    );

    let mut app = App::new(&config)?;

    if let Some(descriptor) = args.descriptor {
        let mut stdout = std::io::stdout();
        app.handle_input(&format!(":connect {descriptor}"), &mut stdout)?;
    }

    app.run().await?;

    tracing::info!("webterm shutting down");

    Ok(())
}
