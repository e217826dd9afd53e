//! Row shapes returned by join queries. Column aliases in the SQL must match
//! these field names.

use crate::model::{
    aggregate::{OrderAggregate, OrderItemAggregate},
    delivery::{Delivery, DeliveryStatus},
    item::Item,
    member::{Address, Member},
    order::{Order, OrderStatus},
    order_item::OrderItem,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One order joined with its member and delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct OrderMemberDeliveryRow {
    pub order_id: i64,
    pub order_date: NaiveDateTime,
    pub status: OrderStatus,
    pub member_id: i64,
    pub member_name: String,
    pub member_city: String,
    pub member_street: String,
    pub member_zipcode: String,
    pub delivery_id: i64,
    pub delivery_city: String,
    pub delivery_street: String,
    pub delivery_zipcode: String,
    pub delivery_status: DeliveryStatus,
}

impl OrderMemberDeliveryRow {
    pub fn from_parts(order: &Order, member: &Member, delivery: &Delivery) -> Self {
        Self {
            order_id: order.order_id,
            order_date: order.order_date,
            status: order.status,
            member_id: member.member_id,
            member_name: member.name.clone(),
            member_city: member.address.city.clone(),
            member_street: member.address.street.clone(),
            member_zipcode: member.address.zipcode.clone(),
            delivery_id: delivery.delivery_id,
            delivery_city: delivery.address.city.clone(),
            delivery_street: delivery.address.street.clone(),
            delivery_zipcode: delivery.address.zipcode.clone(),
            delivery_status: delivery.status,
        }
    }

    /// Builds the aggregate head; lines are attached by the caller.
    pub fn into_aggregate(self, order_items: Vec<OrderItemAggregate>) -> OrderAggregate {
        OrderAggregate {
            order: Order {
                order_id: self.order_id,
                member_id: self.member_id,
                delivery_id: self.delivery_id,
                order_date: self.order_date,
                status: self.status,
            },
            member: Member {
                member_id: self.member_id,
                name: self.member_name,
                address: Address {
                    city: self.member_city,
                    street: self.member_street,
                    zipcode: self.member_zipcode,
                },
            },
            delivery: Delivery {
                delivery_id: self.delivery_id,
                address: Address {
                    city: self.delivery_city,
                    street: self.delivery_street,
                    zipcode: self.delivery_zipcode,
                },
                status: self.delivery_status,
            },
            order_items,
        }
    }
}

/// One order line joined with its catalogue item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct OrderLineRow {
    pub order_item_id: i64,
    pub order_id: i64,
    pub item_id: i64,
    pub order_price: i32,
    pub count: i32,
    pub item_name: String,
    pub item_price: i32,
}

impl OrderLineRow {
    pub fn from_parts(order_item: &OrderItem, item: &Item) -> Self {
        Self {
            order_item_id: order_item.order_item_id,
            order_id: order_item.order_id,
            item_id: item.item_id,
            order_price: order_item.order_price,
            count: order_item.count,
            item_name: item.name.clone(),
            item_price: item.price,
        }
    }
}

impl From<OrderLineRow> for OrderItemAggregate {
    fn from(row: OrderLineRow) -> Self {
        OrderItemAggregate {
            order_item: OrderItem {
                order_item_id: row.order_item_id,
                order_id: row.order_id,
                item_id: row.item_id,
                order_price: row.order_price,
                count: row.count,
            },
            item: Item {
                item_id: row.item_id,
                name: row.item_name,
                price: row.item_price,
            },
        }
    }
}

/// Output of the collection fetch join: the order head repeated once per
/// line. Line columns are `None` for an order without lines (outer join).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct OrderItemJoinRow {
    #[sqlx(flatten)]
    pub head: OrderMemberDeliveryRow,
    pub order_item_id: Option<i64>,
    pub item_id: Option<i64>,
    pub order_price: Option<i32>,
    pub count: Option<i32>,
    pub item_name: Option<String>,
    pub item_price: Option<i32>,
}

impl OrderItemJoinRow {
    pub fn line(&self) -> Option<OrderItemAggregate> {
        Some(OrderItemAggregate {
            order_item: OrderItem {
                order_item_id: self.order_item_id?,
                order_id: self.head.order_id,
                item_id: self.item_id?,
                order_price: self.order_price?,
                count: self.count?,
            },
            item: Item {
                item_id: self.item_id?,
                name: self.item_name.clone()?,
                price: self.item_price?,
            },
        })
    }
}

/// One row per (order, line) pair with every order-level column repeated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct OrderFlatRow {
    pub order_id: i64,
    pub member_name: String,
    pub order_date: NaiveDateTime,
    pub status: OrderStatus,
    #[sqlx(flatten)]
    pub address: Address,
    pub item_name: String,
    pub order_price: i32,
    pub count: i32,
}
