//! tablebot - restaurant reservation assistant for the terminal
//!
//! Classifies each request (new booking, change, cancellation, other) and
//! hands it to a dedicated dialogue backed by a chat model.

mod branch;
mod config;
mod intent;
mod inventory;
mod llm;
mod memory;
mod prompts;
mod runtime;
mod state_machine;
mod tools;

use config::BotConfig;
use inventory::SeatInventory;
use llm::{LlmService, LoggingService, OpenAIService, RetryingService};
use runtime::{Session, SessionOptions, StdioConsole};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Conversation owns stdout; logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tablebot=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "tablebot exited with an error");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = BotConfig::from_env()?;

    let api_key = config.api_key.clone().unwrap_or_else(|| {
        tracing::warn!("OPENAI_API_KEY is not set; requests will be rejected by the provider");
        String::new()
    });
    let provider: Arc<dyn LlmService> = Arc::new(OpenAIService::new(
        api_key,
        config.model.clone(),
        &config.base_url,
    )?);
    let llm = Arc::new(RetryingService::new(
        Arc::new(LoggingService::new(provider)),
        config.max_attempts,
    ));

    tracing::info!(
        model = %config.model,
        variant = %config.variant,
        branch_exit = %config.branch_exit,
        seat_capacity = config.seat_capacity,
        "Starting session"
    );

    let mut session = Session::new(
        llm,
        StdioConsole::new(),
        Arc::new(SeatInventory::new(config.seat_capacity)),
        SessionOptions {
            variant: config.variant,
            branch_exit: config.branch_exit,
            sampling: config.sampling,
            replay_window: config.memory_window,
            today: chrono::Local::now().date_naive(),
        },
    );
    session.run().await?;
    Ok(())
}
