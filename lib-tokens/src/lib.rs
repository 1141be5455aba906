//! Regulated Token Ledger
//!
//! A balance/allowance ledger whose ordinary transfers must be approved by a
//! replaceable regulator, with owner-gated issuance, burning and forced
//! transfers.
//!
//! # Key Types
//!
//! - [`RegulatedToken`]: The ledger
//! - [`SharedToken`]: Thread-safe handle that rejects re-entrant calls
//! - [`TokenEvent`]: Audit record for every committed change
//! - [`GenesisConfig`]: TOML construction parameters
//!
//! # Execution
//!
//! Every operation is all-or-nothing: checks (including the regulator) run
//! first, effects are applied together, and the audit record is appended
//! last. A failed call leaves the ledger untouched.

pub mod errors;
pub mod events;
pub mod genesis;
pub mod shared;
pub mod token;

pub use errors::{ErrorKind, TokenError, TokenResult};
pub use events::TokenEvent;
pub use genesis::{AllocationConfig, GenesisConfig, RegulatorConfig, RegulatorKind};
pub use shared::SharedToken;
pub use token::{AllowanceEntry, RegulatedToken, TokenMetadata, TokenSnapshot};

pub use lib_regulator::{RegulatorRef, StatusCode, TransferRegulator, SUCCESS_CODE};
