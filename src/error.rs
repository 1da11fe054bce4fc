use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::repository::RepoError;
use crate::shopping_list::ShoppingListError;

pub const NO_CREDENTIALS: &str = "Authentication credentials were not provided.";
pub const INVALID_TOKEN: &str = "Invalid token.";
pub const NOT_FOUND: &str = "Not found.";
pub const INVALID_PAGE: &str = "Invalid page.";

pub const DOUBLE_ADD: &str = "recipe already added";
pub const NO_RECIPE: &str = "recipe does not exist";
pub const NOT_ADDED: &str = "recipe was not added";
pub const DOUBLE_SUB: &str = "already subscribed to this author";
pub const SELF_SUB: &str = "cannot subscribe to yourself";
pub const NOT_SUBSCRIBED: &str = "not subscribed to this author";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("shopping list failed: {0}")]
    ShoppingList(#[from] ShoppingListError),

    #[error("repository failed: {0}")]
    Repository(#[from] RepoError),

    #[error("database circuit open, call rejected")]
    Unavailable,

    #[error("blocking task failed: {0}")]
    Blocking(#[from] BlockingError),

    #[error("{0}")]
    Internal(&'static str),
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        match self {
            ServiceError::BadRequest(message) => {
                HttpResponse::build(status).json(json!({ "errors": message }))
            }
            ServiceError::Unauthorized(message) | ServiceError::NotFound(message) => {
                HttpResponse::build(status).json(json!({ "detail": message }))
            }
            _ => {
                log::error!("{}", self);
                HttpResponse::build(status).json(json!({ "detail": "internal server error" }))
            }
        }
    }
}
