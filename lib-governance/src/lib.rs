//! Ledger Governance - Owner and Active Regulator
//!
//! This crate holds the two pieces of authorization state a regulated ledger
//! carries: the single owner and the currently installed transfer regulator.
//!
//! # Key Principles
//!
//! 1. **Checked at call time**: Every owner-only operation compares the caller
//!    against the stored owner when it runs, never against a cached value
//! 2. **Immediate effect**: Regulator replacement and ownership transfer take
//!    effect on the next operation; there is no pending state
//! 3. **No handshake**: The new owner gains every right the instant
//!    ownership is transferred and the old owner loses them
//!
//! # Usage
//!
//! ```ignore
//! use lib_governance::GovernanceController;
//!
//! let mut governance = GovernanceController::new(owner, lockup)?;
//! governance.replace_regulator(&owner, permissive)?;
//! governance.transfer_ownership(&owner, new_owner)?;
//! ```

pub mod controller;
pub mod errors;

pub use controller::GovernanceController;
pub use errors::{GovernanceError, GovernanceResult};
