use crate::abstract_trait::order::repository::DynOrderQueryRepository;
use shared::errors::ServiceError;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Per-request access to the order store. Each [`ReadSession::gateway`] call
/// stands for one round trip; once closed, the session refuses further access.
pub struct ReadSession {
    repository: DynOrderQueryRepository,
    round_trips: AtomicUsize,
    closed: AtomicBool,
}

impl ReadSession {
    pub fn open(repository: DynOrderQueryRepository) -> Self {
        Self {
            repository,
            round_trips: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        }
    }

    pub fn gateway(&self) -> Result<&DynOrderQueryRepository, ServiceError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ServiceError::DetachedAccess(
                "order data requested after the read session was closed".into(),
            ));
        }

        self.round_trips.fetch_add(1, Ordering::Relaxed);
        Ok(&self.repository)
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn round_trips(&self) -> usize {
        self.round_trips.load(Ordering::Relaxed)
    }
}
