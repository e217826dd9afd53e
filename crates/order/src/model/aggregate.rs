//! Fully resolved order trees.
//!
//! Every association is loaded before an aggregate is built, so nothing here
//! can trigger further I/O. Children never point back at their parent.

use crate::model::{
    delivery::Delivery, item::Item, member::Member, order::Order, order_item::OrderItem,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderItemAggregate {
    pub order_item: OrderItem,
    pub item: Item,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderAggregate {
    pub order: Order,
    pub member: Member,
    pub delivery: Delivery,
    /// Lines in insertion order. Empty when only to-one associations were
    /// requested.
    pub order_items: Vec<OrderItemAggregate>,
}

impl OrderAggregate {
    pub fn order_id(&self) -> i64 {
        self.order.order_id
    }
}
