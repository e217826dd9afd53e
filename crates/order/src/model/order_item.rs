use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OrderItem {
    pub order_item_id: i64,
    pub order_id: i64,
    pub item_id: i64,
    /// Unit price at the time the order was placed.
    pub order_price: i32,
    pub count: i32,
}
