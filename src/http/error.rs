use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;
use crate::user_actor::UserError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("You do not have permission to perform this action.")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MalformedPayload(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Server-side detail stays in the logs.
        let body = if status.is_server_error() {
            error!(error = %self, "Request failed");
            json!({ "error": "Internal server error" })
        } else {
            json!({ "message": self.to_string() })
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedPayload(rejection.body_text())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::Expired => {
                AppError::Unauthorized(err.to_string())
            }
            AuthError::Hashing(_) | AuthError::Signing(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => AppError::NotFound("User not found".to_string()),
            UserError::AlreadyExists(_) => AppError::Conflict(
                "Email already exists. Please use a different email or log in.".to_string(),
            ),
            UserError::ValidationError(msg) => AppError::BadRequest(msg),
            UserError::ActorCommunicationError(msg) => AppError::Internal(msg),
        }
    }
}

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(_) => AppError::NotFound("Product not found".to_string()),
            ProductError::InsufficientStock { .. }
            | ProductError::InvalidQuantity(_)
            | ProductError::ValidationError(_) => AppError::BadRequest(err.to_string()),
            ProductError::ActorCommunicationError(msg) => AppError::Internal(msg),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound(_) => AppError::NotFound("Order not found".to_string()),
            OrderError::InvalidUser(_) => AppError::Unauthorized(err.to_string()),
            OrderError::ValidationError(msg) => AppError::BadRequest(msg),
            OrderError::InvalidProduct(_) | OrderError::InsufficientStock(_) => {
                AppError::BadRequest(err.to_string())
            }
            OrderError::InvalidTransition { .. } => AppError::Conflict(err.to_string()),
            OrderError::ActorCommunicationError(msg) => AppError::Internal(msg),
        }
    }
}
