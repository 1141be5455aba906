//! Transfer Regulators
//!
//! A regulator is the policy gate every ordinary token transfer must pass.
//! The ledger depends only on the [`TransferRegulator`] trait; concrete
//! policies are installed at runtime through a [`RegulatorRef`] and may be
//! swapped without touching balances.
//!
//! # Key Types
//!
//! - [`StatusCode`]: Result of evaluating a transfer ([`SUCCESS_CODE`] approves)
//! - [`TransferRegulator`]: The policy gate capability
//! - [`RegulatorRef`]: An installed regulator and the address it lives at
//! - [`LockupPolicy`], [`PermissivePolicy`], [`AllowlistPolicy`]: Reference policies

pub mod policies;
pub mod regulator;
pub mod status;

pub use policies::{AllowlistPolicy, LockupPolicy, PermissivePolicy};
pub use regulator::{RegulatorRef, TransferRegulator};
pub use status::{message_for_code, StatusCode, SUCCESS_CODE};
