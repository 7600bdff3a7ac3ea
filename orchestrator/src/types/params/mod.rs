pub mod service;

use std::time::Duration;

use crate::cli::processor::ProcessorCliArgs;
use crate::cli::store::StoreCliArgs;
pub use service::{ServerParams, ServiceParams};
use url::Url;

/// StoreParams - Arguments used to connect to the key-value store
#[derive(Debug, Clone)]
pub struct StoreParams {
    pub redis_url: String,
    pub pool_size: usize,
    pub timeout: Duration,
}

impl From<StoreCliArgs> for StoreParams {
    fn from(args: StoreCliArgs) -> Self {
        Self {
            redis_url: args.redis_url,
            pool_size: args.redis_pool_size,
            timeout: Duration::from_millis(args.redis_timeout_ms),
        }
    }
}

/// FunctionsParams - Arguments used to invoke the external processing functions
#[derive(Debug, Clone)]
pub struct FunctionsParams {
    pub base_url: Url,
    pub token: Option<String>,
    pub timeout: Duration,
}

/// CatalogParams - Arguments used to query the system of record
#[derive(Debug, Clone)]
pub struct CatalogParams {
    pub base_url: Url,
    pub api_key: String,
}

impl From<ProcessorCliArgs> for FunctionsParams {
    fn from(args: ProcessorCliArgs) -> Self {
        Self {
            base_url: args.functions_url,
            token: args.functions_token,
            timeout: Duration::from_secs(args.functions_timeout_seconds),
        }
    }
}

impl From<ProcessorCliArgs> for CatalogParams {
    fn from(args: ProcessorCliArgs) -> Self {
        Self { base_url: args.catalog_url, api_key: args.catalog_key }
    }
}
