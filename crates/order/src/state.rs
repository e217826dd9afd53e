use crate::{
    abstract_trait::order::repository::DynOrderQueryRepository,
    config::myconfig::Config,
    di::{DependenciesInject, DependenciesInjectDeps},
    repository::order::OrderQueryRepository,
};
use anyhow::{Context, Result};
use prometheus_client::registry::Registry;
use shared::{
    config::ConnectionPool,
    utils::{SystemMetrics, run_metrics_collector},
};
use std::{fmt, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub di_container: DependenciesInject,
    pub registry: Arc<Mutex<Registry>>,
    pub system_metrics: Arc<SystemMetrics>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("deps", &self.di_container)
            .field("system_metrics", &self.system_metrics)
            .finish()
    }
}

impl AppState {
    /// Production wiring: PostgreSQL repository and the system metrics
    /// collector running in the background.
    pub fn new(pool: ConnectionPool, config: &Config) -> Result<Self> {
        let repository = Arc::new(OrderQueryRepository::new(pool)) as DynOrderQueryRepository;

        let state = Self::build(repository, config.batch_fetch_size)?;

        tokio::spawn(run_metrics_collector(state.system_metrics.clone()));

        Ok(state)
    }

    pub fn build(repository: DynOrderQueryRepository, batch_fetch_size: usize) -> Result<Self> {
        let mut registry = Registry::default();
        let system_metrics = Arc::new(SystemMetrics::new());

        let deps = DependenciesInjectDeps {
            repository,
            batch_fetch_size,
        };

        let di_container = DependenciesInject::new(deps, &mut registry)
            .context("Failed to initialize dependency injection container")?;

        registry.register_metrics(&system_metrics);

        Ok(Self {
            di_container,
            registry: Arc::new(Mutex::new(registry)),
            system_metrics,
        })
    }
}

trait MetricsRegister {
    fn register_metrics(&mut self, metrics: &SystemMetrics);
}

impl MetricsRegister for Registry {
    fn register_metrics(&mut self, metrics: &SystemMetrics) {
        metrics.register(self);
    }
}
