use crate::model::{
    aggregate::{OrderAggregate, OrderItemAggregate},
    member::Address,
    order::OrderStatus,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderLineSummary {
    pub item_name: String,
    /// Price at order time.
    pub price: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderSummary {
    pub order_id: i64,
    pub member_name: String,
    pub order_date: NaiveDateTime,
    pub status: OrderStatus,
    /// Delivery address.
    pub address: Address,
    pub items: Vec<OrderLineSummary>,
}

/// Order-level fields only. Also the row shape of the narrow projection
/// query, hence `FromRow`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OrderSimpleSummary {
    pub order_id: i64,
    pub member_name: String,
    pub order_date: NaiveDateTime,
    pub status: OrderStatus,
    #[sqlx(flatten)]
    pub address: Address,
}

// model to response

impl From<&OrderItemAggregate> for OrderLineSummary {
    fn from(value: &OrderItemAggregate) -> Self {
        OrderLineSummary {
            item_name: value.item.name.clone(),
            price: value.order_item.order_price,
            quantity: value.order_item.count,
        }
    }
}

impl From<&OrderAggregate> for OrderSummary {
    fn from(value: &OrderAggregate) -> Self {
        OrderSummary {
            order_id: value.order.order_id,
            member_name: value.member.name.clone(),
            order_date: value.order.order_date,
            status: value.order.status,
            address: value.delivery.address.clone(),
            items: value.order_items.iter().map(OrderLineSummary::from).collect(),
        }
    }
}

impl From<&OrderAggregate> for OrderSimpleSummary {
    fn from(value: &OrderAggregate) -> Self {
        OrderSimpleSummary {
            order_id: value.order.order_id,
            member_name: value.member.name.clone(),
            order_date: value.order.order_date,
            status: value.order.status,
            address: value.delivery.address.clone(),
        }
    }
}

impl From<OrderSummary> for OrderSimpleSummary {
    fn from(value: OrderSummary) -> Self {
        OrderSimpleSummary {
            order_id: value.order_id,
            member_name: value.member_name,
            order_date: value.order_date,
            status: value.status,
            address: value.address,
        }
    }
}

/// Projects resolved aggregates, one summary per aggregate, input order kept.
pub fn project_summaries(orders: &[OrderAggregate]) -> Vec<OrderSummary> {
    orders.iter().map(OrderSummary::from).collect()
}

pub fn project_simple_summaries(orders: &[OrderAggregate]) -> Vec<OrderSimpleSummary> {
    orders.iter().map(OrderSimpleSummary::from).collect()
}
