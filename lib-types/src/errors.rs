//! Primitive parsing errors

use thiserror::Error;

/// Error parsing an [`Address`](crate::Address) from text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseAddressError {
    #[error("Invalid address length: expected 64 hex digits, got {0}")]
    InvalidLength(usize),

    #[error("Invalid hex in address: {0}")]
    InvalidHex(String),
}
