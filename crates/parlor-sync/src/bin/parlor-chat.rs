use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use parlor_protocol::Message;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use parlor_sync::{Draft, SyncAgent, SyncConfig, spawn_polling};

const RETRY_COMMAND: &str = "/retry";
const QUIT_COMMAND: &str = "/quit";

#[derive(Parser, Debug)]
#[command(name = "parlor-chat")]
#[command(about = "Terminal chat client for a Parlor server")]
#[command(version)]
struct Cli {
    /// Base URL of the server
    #[arg(short, long, env = "PARLOR_CHAT_SERVER", default_value = "http://127.0.0.1:7000")]
    server: String,

    /// Display name attached to your messages
    #[arg(short, long, env = "PARLOR_CHAT_NAME")]
    name: String,

    /// Seconds between polls
    #[arg(long, env = "PARLOR_CHAT_POLL_SECS", default_value_t = 5)]
    poll_secs: u64,

    /// Request timeout in seconds
    #[arg(long, env = "PARLOR_CHAT_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,

    /// Increase logging verbosity (stackable)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            server_url: self.server.clone(),
            poll_interval_secs: self.poll_secs,
            request_timeout_secs: self.timeout_secs,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with the chat on stdout.
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("parlor_sync={level},parlor_chat={level}"))),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(io::stderr().is_terminal()),
        )
        .init();

    let config = cli.sync_config();
    let agent = Arc::new(SyncAgent::from_config(&config).context("creating HTTP client")?);
    info!(server = %config.base_url(), "connecting");

    let shutdown = CancellationToken::new();
    let events = agent.subscribe();
    let renderer = tokio::spawn(render(agent.clone(), events, shutdown.clone()));
    let poller = spawn_polling(agent.clone(), config.poll_interval(), shutdown.clone());

    let mut draft = Draft::new(cli.name.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        match line.trim() {
            QUIT_COMMAND => break,
            RETRY_COMMAND => {
                if draft.content().is_empty() {
                    eprintln!("nothing to retry");
                    continue;
                }
            }
            _ => draft.set_content(line.as_str()),
        }

        match draft.submit(&agent).await {
            Ok(message) => debug!(id = %message.id, "sent"),
            Err(err) if err.is_retryable() => eprintln!("{err}; type {RETRY_COMMAND} to resend"),
            Err(err) => eprintln!("{err}"),
        }
    }

    shutdown.cancel();
    poller.await.context("joining polling task")?;
    renderer.await.context("joining render task")?;
    Ok(())
}

/// Print each message once, in local view order.
async fn render(
    agent: Arc<SyncAgent>,
    mut events: broadcast::Receiver<Message>,
    shutdown: CancellationToken,
) {
    let mut printed = 0;

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            event = events.recv() => match event {
                Ok(_) | Err(RecvError::Lagged(_)) => {
                    for message in agent.messages_from(printed).await {
                        print_message(&message);
                        printed += 1;
                    }
                }
                Err(RecvError::Closed) => break,
            },
        }
    }
}

fn print_message(message: &Message) {
    println!(
        "[{}] {}: {}",
        message.timestamp.with_timezone(&chrono::Local).format("%H:%M:%S"),
        message.sender,
        message.content
    );
}
