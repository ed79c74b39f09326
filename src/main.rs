//! Threadline - Entry Point
//!
//! Loads configuration, wires the collaborators, then either runs the `-e`
//! commands as one batch or reads commands from stdin until `quit`.

use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use threadline::agent::{Agent, Collaborators};
use threadline::core::config::AgentConfig;
use threadline::core::error::Result;
use threadline::llm::{ContentGenerator, DisabledGenerator, LlmClient, LlmThreadGenerator};
use threadline::platform::DryRunPlatform;
use threadline::terminal::run_repl;
use tracing_subscriber::EnvFilter;

/// Social posting agent terminal
#[derive(Parser, Debug)]
#[command(name = "threadline")]
#[command(about = "Run agent commands such as create-thread and thread-status")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Command line to execute; repeat to run a batch in order
    #[arg(short = 'e', long = "exec")]
    exec: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("threadline=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = AgentConfig::load(args.config.as_deref())?;
    tracing::info!(agent = %config.agent_name, "Threadline starting...");

    let generator: Arc<dyn ContentGenerator> = match LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(
                model = client.model(),
                format = ?client.format(),
                "Content generation enabled"
            );
            Arc::new(LlmThreadGenerator::new(client, &config.agent_name, &config.thread))
        }
        Err(e) => {
            tracing::warn!("{} - create-thread will fail until an LLM is configured", e);
            Arc::new(DisabledGenerator::new(e.to_string()))
        }
    };

    // Network transport is not part of this binary; posts go to the log.
    tracing::warn!("Using dry-run platform: posts are logged, not sent");
    let platform = Arc::new(DryRunPlatform::new());

    let collaborators = Collaborators::from_config(&config, platform, generator)?;
    let agent = Agent::build(&config, collaborators)?;

    if !args.exec.is_empty() {
        let batch = agent.executor.execute_batch(&args.exec).await;
        println!("{}", batch.output);
        return Ok(());
    }

    let stdin = io::stdin();
    run_repl(&agent.executor, stdin.lock(), io::stdout()).await
}
