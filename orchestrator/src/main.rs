use std::sync::Arc;

use clap::Parser as _;
use dotenvy::dotenv;
use scribe_orchestrator::cli::{Cli, Commands, ProcessCmd, RunCmd};
use scribe_orchestrator::core::config::Config;
use scribe_orchestrator::server::setup_server;
use scribe_orchestrator::utils::logging::init_logging;
use scribe_orchestrator::worker::{DispatchOutcome, ProcessingDispatcher};
use scribe_orchestrator::{OrchestratorError, OrchestratorResult};
use tracing::{debug, error, info};

/// Start the orchestrator
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    dotenv().ok();
    init_logging()?;
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Run { run_command } => {
            info!("Starting orchestrator service");
            run_orchestrator(run_command).await
        }
        Commands::Process { process_command } => {
            info!(category = %process_command.category, "Running a single dispatcher invocation");
            process_once(process_command).await
        }
    };

    if let Err(e) = &result {
        error!(error = %e, error_chain = ?e, "Orchestrator command failed");
    }
    Ok(result?)
}

async fn run_orchestrator(run_cmd: &RunCmd) -> OrchestratorResult<()> {
    let config = Arc::new(Config::from_run_cmd(run_cmd)?);
    debug!("Configuration initialized");

    let (address, server_handle) = setup_server(config.clone()).await?;
    info!(address = %address, "Orchestrator service started");

    tokio::signal::ctrl_c().await?;

    server_handle.shutdown().await.map_err(|e| OrchestratorError::ServerError(e.to_string()))?;
    info!("Orchestrator service shut down");
    Ok(())
}

async fn process_once(process_cmd: &ProcessCmd) -> OrchestratorResult<()> {
    let config = Arc::new(Config::from_run_cmd(&process_cmd.run_command)?);

    let outcome =
        ProcessingDispatcher::process_next(process_cmd.category, process_cmd.lock_timeout_seconds, config).await?;
    match &outcome {
        DispatchOutcome::Processed { job_id, success: false, message, requeued } => {
            error!(job_id = %job_id, requeued, message = %message, "Job processing failed");
            Err(OrchestratorError::ProcessCommandError(message.clone()))
        }
        _ => {
            info!(outcome = ?outcome, message = %outcome.message(), "Dispatcher invocation finished");
            Ok(())
        }
    }
}
