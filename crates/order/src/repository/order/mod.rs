mod memory;
mod query;

pub use self::memory::InMemoryOrderRepository;
pub use self::query::OrderQueryRepository;
