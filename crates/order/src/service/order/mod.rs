mod grouping;
mod query;
mod session;
mod strategy;

pub use self::grouping::{
    OrderFlatKey, dedupe_joined_rows, ensure_distinct_orders, group_stable, regroup_flat_rows,
};
pub use self::query::{OrderQueryService, RetrievalLabels, RetrievalMetrics};
pub use self::session::ReadSession;
pub use self::strategy::{
    Associations, DEFAULT_BATCH_FETCH_SIZE, OrderRetrieval, OrderRows, Retrieval,
    RetrievalStrategy,
};
