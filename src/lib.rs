//! Shop Back-office
//!
//! REST back-office for a small shop.
//!
//! ## Features
//! - Category, brand and product catalog management
//! - Order entry with price snapshots and percentage discounts
//! - Email/password accounts with bearer tokens
//! - Site settings, dashboard counts and sales reports

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod events;
pub mod services;
pub mod state;
pub mod store;
pub mod uploads;

use thiserror::Error;
use crate::domain::aggregates::{OrderError, StatusParseError};
use crate::domain::value_objects::{AmountError, DiscountError, NameError, QuantityError};

pub use config::Config;
pub use state::AppState;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum BackofficeError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} already exists")]
    Duplicate(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthorized(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl BackofficeError {
    pub fn validation(message: impl Into<String>) -> Self { Self::Validation(message.into()) }
}

impl From<sqlx::Error> for BackofficeError {
    fn from(e: sqlx::Error) -> Self { Self::Storage(e.to_string()) }
}

impl From<std::io::Error> for BackofficeError {
    fn from(e: std::io::Error) -> Self { Self::Storage(e.to_string()) }
}

impl From<OrderError> for BackofficeError {
    fn from(e: OrderError) -> Self { Self::Validation(e.to_string()) }
}

impl From<NameError> for BackofficeError {
    fn from(e: NameError) -> Self { Self::Validation(e.to_string()) }
}

impl From<AmountError> for BackofficeError {
    fn from(e: AmountError) -> Self { Self::Validation(e.to_string()) }
}

impl From<QuantityError> for BackofficeError {
    fn from(e: QuantityError) -> Self { Self::Validation(e.to_string()) }
}

impl From<DiscountError> for BackofficeError {
    fn from(e: DiscountError) -> Self { Self::Validation(e.to_string()) }
}

impl From<StatusParseError> for BackofficeError {
    fn from(e: StatusParseError) -> Self { Self::Validation(e.to_string()) }
}

pub type Result<T> = std::result::Result<T, BackofficeError>;
