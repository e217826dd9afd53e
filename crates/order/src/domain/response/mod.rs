pub mod api;
pub mod order;
