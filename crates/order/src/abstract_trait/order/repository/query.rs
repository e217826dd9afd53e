use crate::{
    domain::{requests::order::PageWindow, response::order::OrderSimpleSummary},
    model::{
        delivery::Delivery,
        member::Member,
        order::Order,
        row::{OrderFlatRow, OrderItemJoinRow, OrderLineRow, OrderMemberDeliveryRow},
    },
};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynOrderQueryRepository = Arc<dyn OrderQueryRepositoryTrait + Send + Sync>;

/// Read access to the order store. Every method is one round trip and every
/// result is sorted by order id, then order item id.
#[async_trait]
pub trait OrderQueryRepositoryTrait {
    /// Orders without any association.
    async fn find_orders(&self, window: &PageWindow) -> Result<Vec<Order>, RepositoryError>;

    async fn find_member(&self, member_id: i64) -> Result<Option<Member>, RepositoryError>;

    async fn find_delivery(&self, delivery_id: i64) -> Result<Option<Delivery>, RepositoryError>;

    /// Lines of one order with their items.
    async fn find_order_lines(&self, order_id: i64) -> Result<Vec<OrderLineRow>, RepositoryError>;

    /// Lines of several orders with their items, in a single `ANY` query.
    async fn find_order_lines_in(
        &self,
        order_ids: &[i64],
    ) -> Result<Vec<OrderLineRow>, RepositoryError>;

    /// Orders joined with member and delivery. One row per order, so the
    /// window is applied by the store.
    async fn find_orders_with_member_delivery(
        &self,
        window: &PageWindow,
    ) -> Result<Vec<OrderMemberDeliveryRow>, RepositoryError>;

    /// Orders joined with member, delivery, lines and items. One row per
    /// line; cannot be paginated.
    async fn find_orders_with_items(&self) -> Result<Vec<OrderItemJoinRow>, RepositoryError>;

    /// Narrow-column projection straight into the response shape.
    async fn find_order_simple_rows(&self) -> Result<Vec<OrderSimpleSummary>, RepositoryError>;

    /// Fully flattened (order, line) rows. Inner joins: orders without lines
    /// are not returned.
    async fn find_order_flat_rows(&self) -> Result<Vec<OrderFlatRow>, RepositoryError>;
}
