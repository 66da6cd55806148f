use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("{0}")]
    IO(#[from] std::io::Error),

    #[error("{0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("{0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0}")]
    InvalidConfig(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Already bookmarked")]
    AlreadyBookmarked,

    #[error("Sign in required")]
    Unauthorized,
}

impl IntoResponse for PortalError {
    fn into_response(self) -> axum::response::Response {
        match self {
            PortalError::IO(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
            PortalError::Sqlx(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
            PortalError::Migrate(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
            PortalError::Json(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
            PortalError::Yaml(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
            PortalError::InvalidConfig(e) => (StatusCode::BAD_REQUEST, e).into_response(),
            PortalError::NotFound(e) => (StatusCode::NOT_FOUND, e).into_response(),
            e @ PortalError::AlreadyBookmarked => {
                (StatusCode::CONFLICT, e.to_string()).into_response()
            }
            e @ PortalError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, e.to_string()).into_response()
            }
        }
    }
}
