use clap::Args;
use url::Url;

/// Parameters of the external processing functions and of the system of record.
#[derive(Debug, Clone, Args)]
#[group()]
pub struct ProcessorCliArgs {
    /// Base URL under which the processing functions are invoked
    /// (`<url>/whisper-transcribe`, `<url>/translate-text`, `<url>/summarize-text`).
    #[arg(env = "SCRIBE_ORCHESTRATOR_FUNCTIONS_URL", long)]
    pub functions_url: Url,

    /// Bearer token sent to the processing functions.
    #[arg(env = "SCRIBE_ORCHESTRATOR_FUNCTIONS_TOKEN", long)]
    pub functions_token: Option<String>,

    /// Timeout in seconds of a single processing call.
    #[arg(env = "SCRIBE_ORCHESTRATOR_FUNCTIONS_TIMEOUT_SECONDS", long, default_value = "300")]
    pub functions_timeout_seconds: u64,

    /// Base URL of the REST interface of the system of record (`<url>/rest/v1/<table>`).
    #[arg(env = "SCRIBE_ORCHESTRATOR_CATALOG_URL", long)]
    pub catalog_url: Url,

    /// Service key used against the system of record.
    #[arg(env = "SCRIBE_ORCHESTRATOR_CATALOG_KEY", long)]
    pub catalog_key: String,
}
