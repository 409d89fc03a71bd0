//! Errors raised while parsing or validating fundamental types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid protocol parameter `{name}`: {reason}")]
    InvalidParam { name: &'static str, reason: String },
}
