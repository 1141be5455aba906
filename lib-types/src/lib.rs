//! Regulated token ledger primitives.
//! Stable, policy-neutral, behavior-free.
//!
//! Rule: No String identifiers in ledger state. Ever.

pub mod errors;
pub mod primitives;

pub use errors::ParseAddressError;
pub use primitives::{Address, Amount};
