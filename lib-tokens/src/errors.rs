//! Token Ledger Errors

use lib_governance::GovernanceError;
use lib_regulator::{message_for_code, StatusCode};
use lib_types::{Address, Amount};
use thiserror::Error;

/// Error during token operations
///
/// Every error aborts the whole operation; ledger state after a failure is
/// identical to the state before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Unauthorized: {caller} is not the owner")]
    Unauthorized { caller: Address },

    #[error("Transfer rejected by regulator: code {code:?} ({reason})")]
    PolicyRejected {
        code: StatusCode,
        reason: &'static str,
    },

    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: Amount, need: Amount },

    #[error("Insufficient allowance: have {have}, need {need}")]
    InsufficientAllowance { have: Amount, need: Amount },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Re-entrant ledger call rejected")]
    Reentrancy,

    #[error("Conservation invariant violated: {0}")]
    ConservationViolated(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse failure classification reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unauthorized,
    PolicyRejected,
    InsufficientBalance,
    InsufficientAllowance,
    InvalidArgument,
    Reentrancy,
    Internal,
}

impl TokenError {
    /// Build a rejection from a regulator status code
    pub fn rejected(code: StatusCode) -> Self {
        TokenError::PolicyRejected {
            code,
            reason: message_for_code(code),
        }
    }

    /// Taxonomy kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            TokenError::Unauthorized { .. } => ErrorKind::Unauthorized,
            TokenError::PolicyRejected { .. } => ErrorKind::PolicyRejected,
            TokenError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            TokenError::InsufficientAllowance { .. } => ErrorKind::InsufficientAllowance,
            TokenError::InvalidArgument(_) | TokenError::Overflow | TokenError::Config(_) => {
                ErrorKind::InvalidArgument
            }
            TokenError::Reentrancy => ErrorKind::Reentrancy,
            TokenError::ConservationViolated(_) => ErrorKind::Internal,
        }
    }
}

impl From<GovernanceError> for TokenError {
    fn from(err: GovernanceError) -> Self {
        match err {
            GovernanceError::Unauthorized { caller } => TokenError::Unauthorized { caller },
            GovernanceError::InvalidOwner => TokenError::InvalidArgument(err.to_string()),
        }
    }
}

/// Result type for token operations
pub type TokenResult<T> = Result<T, TokenError>;
