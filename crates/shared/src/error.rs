use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Validation,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        Self::new(ErrorCode::Validation, value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name is required")]
    MissingName,
    #[error("quantity is required")]
    MissingQuantity,
    #[error("invalid quantity '{0}': expected a whole number")]
    InvalidQuantity(String),
    #[error("quantity must not be negative")]
    NegativeQuantity,
    #[error("price is required")]
    MissingPrice,
    #[error("invalid price '{0}': expected a number")]
    InvalidPrice(String),
    #[error("price must not be negative")]
    NegativePrice,
    #[error("name and quantity (or price) are required")]
    MissingAmount,
    #[error("file uploads are not supported for field '{0}'; send an image URL")]
    UnsupportedUpload(String),
}
