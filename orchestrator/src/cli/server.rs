use clap::Args;

/// Parameters used to config the server.
#[derive(Debug, Clone, Args)]
#[group()]
pub struct ServerCliArgs {
    /// The host to listen on.
    #[arg(env = "SCRIBE_ORCHESTRATOR_HOST", long, default_value = "127.0.0.1")]
    pub host: String,

    /// The port to listen on.
    #[arg(env = "SCRIBE_ORCHESTRATOR_PORT", long, default_value = "3000")]
    pub port: u16,

    /// Shared key that unlocks the admin monitoring endpoints (sent as `x-api-key`).
    /// Admin endpoints stay closed while this is unset.
    #[arg(env = "SCRIBE_ORCHESTRATOR_MONITORING_API_KEY", long)]
    pub monitoring_api_key: Option<String>,

    /// Secret the external processors send with completion webhooks.
    /// Every webhook is rejected while this is unset.
    #[arg(env = "SCRIBE_ORCHESTRATOR_WEBHOOK_SECRET", long)]
    pub webhook_secret: Option<String>,
}
