//! Transfer restriction status codes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of a regulator evaluating a proposed transfer
///
/// Exactly one value, [`SUCCESS_CODE`], means the transfer is approved.
/// Every other value is a rejection whose meaning is regulator-defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusCode(pub u8);

/// The only status code that approves a transfer
pub const SUCCESS_CODE: StatusCode = StatusCode::SUCCESS;

impl StatusCode {
    /// Transfer approved
    pub const SUCCESS: Self = Self(0);
    /// Sender or recipient is inside a lockup window
    pub const LOCKED: Self = Self(1);
    /// Sender or recipient is not on the allowlist
    pub const NOT_ALLOWLISTED: Self = Self(2);

    /// Whether this code approves the transfer
    pub fn is_success(&self) -> bool {
        *self == Self::SUCCESS
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, message_for_code(*self))
    }
}

/// Human-readable reason for a status code
pub fn message_for_code(code: StatusCode) -> &'static str {
    match code {
        StatusCode::SUCCESS => "transfer approved",
        StatusCode::LOCKED => "tokens are locked",
        StatusCode::NOT_ALLOWLISTED => "address is not allowlisted",
        _ => "transfer restricted",
    }
}
