//! Audit records for committed ledger changes

use serde::{Deserialize, Serialize};
use std::fmt;

use lib_types::{Address, Amount};

/// One committed state change
///
/// A record is appended only when its operation succeeds, as the last step of
/// that operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenEvent {
    /// Regulated transfer (`transfer` or `transfer_from`)
    Transfer {
        from: Address,
        to: Address,
        amount: Amount,
    },

    /// Allowance set
    Approval {
        owner: Address,
        spender: Address,
        amount: Amount,
    },

    /// New supply issued (including genesis allocations)
    Mint { to: Address, amount: Amount },

    /// Supply destroyed
    Burn { from: Address, amount: Amount },

    /// Owner-initiated transfer that bypassed the regulator
    ForcedTransfer {
        operator: Address,
        from: Address,
        to: Address,
        amount: Amount,
    },

    /// Active regulator swapped
    RegulatorReplaced { previous: Address, current: Address },

    /// Owner changed
    OwnershipTransferred { previous: Address, current: Address },
}

impl fmt::Display for TokenEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenEvent::Transfer { amount, .. } => write!(f, "Transfer(amount={})", amount),
            TokenEvent::Approval { amount, .. } => write!(f, "Approval(amount={})", amount),
            TokenEvent::Mint { amount, .. } => write!(f, "Mint(amount={})", amount),
            TokenEvent::Burn { amount, .. } => write!(f, "Burn(amount={})", amount),
            TokenEvent::ForcedTransfer { amount, .. } => {
                write!(f, "ForcedTransfer(amount={})", amount)
            }
            TokenEvent::RegulatorReplaced { current, .. } => {
                write!(f, "RegulatorReplaced({})", hex::encode(&current.as_bytes()[..8]))
            }
            TokenEvent::OwnershipTransferred { current, .. } => {
                write!(f, "OwnershipTransferred({})", hex::encode(&current.as_bytes()[..8]))
            }
        }
    }
}
