pub mod aggregate;
pub mod delivery;
pub mod item;
pub mod member;
pub mod order;
pub mod order_item;
pub mod row;
