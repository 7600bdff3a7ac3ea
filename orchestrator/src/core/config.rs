use std::sync::Arc;

use tracing::info;

use crate::cli::RunCmd;
use crate::core::client::{
    Cache, DistributedLock, EntityCatalog, HttpProcessor, JobProcessor, JobQueue, KvStore, RateLimiter, RedisStore,
    RestCatalog,
};
use crate::core::error::OrchestratorCoreResult;
use crate::monitor::recorder::{ApiStatsRecorder, QueueMetricsRecorder};
use crate::types::params::{CatalogParams, FunctionsParams, ServerParams, ServiceParams, StoreParams};

/// Everything a request handler or a dispatcher run needs.
///
/// All components share the one injected store; none of them keeps state of its own.
pub struct Config {
    store: Arc<dyn KvStore>,
    queue: JobQueue,
    lock: DistributedLock,
    cache: Cache,
    rate_limiter: RateLimiter,
    queue_metrics: QueueMetricsRecorder,
    api_stats: ApiStatsRecorder,
    processor: Arc<dyn JobProcessor>,
    catalog: Arc<dyn EntityCatalog>,
    service_params: ServiceParams,
    server_params: ServerParams,
}

impl Config {
    pub fn new(
        store: Arc<dyn KvStore>,
        processor: Arc<dyn JobProcessor>,
        catalog: Arc<dyn EntityCatalog>,
        service_params: ServiceParams,
        server_params: ServerParams,
    ) -> Self {
        Self {
            queue: JobQueue::new(store.clone()),
            lock: DistributedLock::new(store.clone()),
            cache: Cache::new(store.clone()),
            rate_limiter: RateLimiter::new(store.clone()),
            queue_metrics: QueueMetricsRecorder::new(store.clone(), service_params.metrics_window_seconds),
            api_stats: ApiStatsRecorder::new(store.clone()),
            store,
            processor,
            catalog,
            service_params,
            server_params,
        }
    }

    /// Builds the config from the command line. Connections are opened lazily.
    pub fn from_run_cmd(run_cmd: &RunCmd) -> OrchestratorCoreResult<Self> {
        let store_params = StoreParams::from(run_cmd.store_args.clone());
        let functions_params = FunctionsParams::from(run_cmd.processor_args.clone());
        let catalog_params = CatalogParams::from(run_cmd.processor_args.clone());

        let store: Arc<dyn KvStore> = Arc::new(RedisStore::new(&store_params)?);
        let processor: Arc<dyn JobProcessor> = Arc::new(HttpProcessor::new(&functions_params)?);
        let catalog: Arc<dyn EntityCatalog> = Arc::new(RestCatalog::new(&catalog_params));
        info!(functions_url = %functions_params.base_url, catalog_url = %catalog_params.base_url, "Clients configured");

        Ok(Self::new(
            store,
            processor,
            catalog,
            ServiceParams::from(run_cmd.service_args.clone()),
            ServerParams::from(run_cmd.server_args.clone()),
        ))
    }

    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.store
    }

    pub fn queue(&self) -> &JobQueue {
        &self.queue
    }

    pub fn lock(&self) -> &DistributedLock {
        &self.lock
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    pub fn queue_metrics(&self) -> &QueueMetricsRecorder {
        &self.queue_metrics
    }

    pub fn api_stats(&self) -> &ApiStatsRecorder {
        &self.api_stats
    }

    pub fn processor(&self) -> &dyn JobProcessor {
        self.processor.as_ref()
    }

    pub fn catalog(&self) -> &dyn EntityCatalog {
        self.catalog.as_ref()
    }

    pub fn service_params(&self) -> &ServiceParams {
        &self.service_params
    }

    pub fn server_params(&self) -> &ServerParams {
        &self.server_params
    }
}
