//! Governance Errors

use lib_types::Address;
use thiserror::Error;

/// Error during governance operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("Unauthorized: {caller} is not the owner")]
    Unauthorized { caller: Address },

    #[error("Invalid owner: the zero address cannot own the ledger")]
    InvalidOwner,
}

/// Result type for governance operations
pub type GovernanceResult<T> = Result<T, GovernanceError>;
