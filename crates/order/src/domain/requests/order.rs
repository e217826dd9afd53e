use serde::{Deserialize, Serialize};
use shared::errors::ServiceError;
use utoipa::IntoParams;
use validator::Validate;

pub const DEFAULT_OFFSET: i64 = 0;
pub const DEFAULT_LIMIT: i64 = 100;

/// Query-string window accepted by the order list endpoints.
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FindAllOrder {
    /// Number of orders to skip, in order id order.
    #[validate(range(min = 0, message = "offset must not be negative"))]
    pub offset: Option<i64>,

    /// Maximum number of orders to return.
    #[validate(range(min = 0, message = "limit must not be negative"))]
    pub limit: Option<i64>,
}

impl FindAllOrder {
    /// Window as sent, without a default limit.
    pub fn window(&self) -> Result<PageWindow, ServiceError> {
        PageWindow::new(self.offset.unwrap_or(DEFAULT_OFFSET), self.limit)
    }

    /// Window for the paginated endpoint: missing values fall back to
    /// `offset = 0`, `limit = 100`.
    pub fn window_or_default(&self) -> Result<PageWindow, ServiceError> {
        PageWindow::new(
            self.offset.unwrap_or(DEFAULT_OFFSET),
            Some(self.limit.unwrap_or(DEFAULT_LIMIT)),
        )
    }
}

/// Offset/limit pair handed to the retrieval strategies. `limit: None` means
/// no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    offset: i64,
    limit: Option<i64>,
}

impl PageWindow {
    pub fn new(offset: i64, limit: Option<i64>) -> Result<Self, ServiceError> {
        let mut errors = Vec::new();

        if offset < 0 {
            errors.push(format!("offset must not be negative, got {offset}"));
        }
        if let Some(limit) = limit.filter(|l| *l < 0) {
            errors.push(format!("limit must not be negative, got {limit}"));
        }

        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        Ok(Self { offset, limit })
    }

    pub const fn all() -> Self {
        Self {
            offset: 0,
            limit: None,
        }
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn limit(&self) -> Option<i64> {
        self.limit
    }

    pub fn is_unbounded(&self) -> bool {
        self.offset == 0 && self.limit.is_none()
    }

    /// Applies the window to rows that are already in canonical order.
    pub fn apply<T>(&self, rows: impl IntoIterator<Item = T>) -> Vec<T> {
        let skipped = rows.into_iter().skip(self.offset as usize);

        match self.limit {
            Some(limit) => skipped.take(limit as usize).collect(),
            None => skipped.collect(),
        }
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::all()
    }
}
