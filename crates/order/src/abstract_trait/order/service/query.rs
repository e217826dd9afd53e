use crate::{
    domain::{
        requests::order::PageWindow,
        response::{
            api::ApiResponse,
            order::{OrderSimpleSummary, OrderSummary},
        },
    },
    model::aggregate::OrderAggregate,
    service::order::{Associations, RetrievalStrategy},
};
use async_trait::async_trait;
use shared::errors::ServiceError;
use std::sync::Arc;

pub type DynOrderQueryService = Arc<dyn OrderQueryServiceTrait + Send + Sync>;

#[async_trait]
pub trait OrderQueryServiceTrait {
    /// Resolved aggregates as they are, loaded with the plain strategy.
    /// With `Associations::ToOne` the `order_items` stay empty.
    async fn find_order_entities(
        &self,
        associations: Associations,
    ) -> Result<ApiResponse<Vec<OrderAggregate>>, ServiceError>;

    /// Order summaries with their lines. Strategies that cannot paginate
    /// ignore `window`.
    async fn find_orders(
        &self,
        strategy: RetrievalStrategy,
        window: PageWindow,
    ) -> Result<ApiResponse<Vec<OrderSummary>>, ServiceError>;

    /// Order-level summaries; only to-one associations are resolved.
    async fn find_simple_orders(
        &self,
        strategy: RetrievalStrategy,
    ) -> Result<ApiResponse<Vec<OrderSimpleSummary>>, ServiceError>;

    /// Order-level summaries selected directly in the response shape.
    async fn find_simple_order_projections(
        &self,
    ) -> Result<ApiResponse<Vec<OrderSimpleSummary>>, ServiceError>;
}
