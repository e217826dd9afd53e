mod query;

pub use self::query::{DynOrderQueryService, OrderQueryServiceTrait};
