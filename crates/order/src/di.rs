use crate::{
    abstract_trait::order::{repository::DynOrderQueryRepository, service::DynOrderQueryService},
    service::order::OrderQueryService,
};
use anyhow::{Context, Result};
use prometheus_client::registry::Registry;
use std::{fmt, sync::Arc};

#[derive(Clone)]
pub struct DependenciesInject {
    pub order_query: DynOrderQueryService,
}

impl fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("order_query", &"OrderQueryService")
            .finish()
    }
}

#[derive(Clone)]
pub struct DependenciesInjectDeps {
    pub repository: DynOrderQueryRepository,
    pub batch_fetch_size: usize,
}

impl DependenciesInject {
    pub fn new(deps: DependenciesInjectDeps, registry: &mut Registry) -> Result<Self> {
        let DependenciesInjectDeps {
            repository,
            batch_fetch_size,
        } = deps;

        let order_query = OrderQueryService::new(repository, batch_fetch_size, registry)
            .context("failed initialize order query")?;

        Ok(Self {
            order_query: Arc::new(order_query) as DynOrderQueryService,
        })
    }
}
