use crate::types::jobs::JobCategory;
use clap::{Parser, Subcommand};

pub mod processor;
pub mod server;
pub mod service;
pub mod store;

#[derive(Parser, Debug)]
#[command(
    name = "orchestrator",
    about = "Scribe Orchestrator - job queues, processing locks and cache invalidation over Redis",
    long_about = "Scribe Orchestrator coordinates transcription, translation and summarization jobs.\n\n\
    Stateless request handlers share queues, locks, caches and rate limit counters through Redis.",
    after_help = "Examples:\n  \
    orchestrator run --redis-url redis://127.0.0.1:6379 --functions-url https://fn.example.com \\\n    \
    --catalog-url https://db.example.com --catalog-key <key>\n  \
    orchestrator process --category transcription <connection args>"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the orchestrator HTTP service
    Run {
        #[command(flatten)]
        run_command: Box<RunCmd>,
    },
    /// Process at most one job of a category and exit
    #[command(long_about = "Acquire the processing lock of a category, process at most one job and exit.\n\n\
        Meant to be triggered periodically (e.g. by cron). Exits immediately when another \
        processor holds the lock.")]
    Process {
        #[command(flatten)]
        process_command: Box<ProcessCmd>,
    },
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct RunCmd {
    #[clap(flatten)]
    pub server_args: server::ServerCliArgs,

    #[clap(flatten)]
    pub store_args: store::StoreCliArgs,

    #[clap(flatten)]
    pub service_args: service::ServiceCliArgs,

    #[clap(flatten)]
    pub processor_args: processor::ProcessorCliArgs,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct ProcessCmd {
    /// Category whose queue is processed
    #[arg(long)]
    pub category: JobCategory,

    /// Lock TTL in seconds for this invocation; defaults to the configured lock TTL
    #[arg(long)]
    pub lock_timeout_seconds: Option<u64>,

    #[clap(flatten)]
    pub run_command: RunCmd,
}
