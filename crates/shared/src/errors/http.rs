use crate::errors::{error::ErrorResponse, repository::RepositoryError, service::ServiceError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    ServiceUnavailable(String),
    Internal(String),
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(errors) => {
                HttpError::BadRequest(format!("Validation failed: {}", errors.join("; ")))
            }

            ServiceError::Repo(repo_err) if repo_err.is_pool_exhausted() => {
                HttpError::ServiceUnavailable("Database is busy, try again later".into())
            }

            ServiceError::Repo(RepositoryError::Sqlx(err)) => {
                error!("❌ Unhandled database error: {err}");
                HttpError::Internal("Repository error".into())
            }

            ServiceError::Repo(RepositoryError::Custom(msg)) => HttpError::Internal(msg),

            ServiceError::DetachedAccess(msg) => {
                HttpError::Internal(format!("Detached access: {msg}"))
            }

            ServiceError::Internal(msg) => HttpError::Internal(msg),
        }
    }
}

impl HttpError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            HttpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let msg = match self {
            HttpError::BadRequest(msg)
            | HttpError::ServiceUnavailable(msg)
            | HttpError::Internal(msg) => msg,
        };

        (status, Json(ErrorResponse::error(msg))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = HttpError::from(ServiceError::Validation(vec![
            "offset must not be negative".into(),
        ]));

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn detached_access_maps_to_internal_error() {
        let err = HttpError::from(ServiceError::DetachedAccess("session closed".into()));

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn pool_timeout_maps_to_service_unavailable() {
        let err = HttpError::from(ServiceError::Repo(RepositoryError::Sqlx(
            sqlx::Error::PoolTimedOut,
        )));

        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn error_body_carries_status_and_message() {
        let body = serde_json::to_value(ErrorResponse::error("boom")).unwrap();

        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "boom");
    }
}
