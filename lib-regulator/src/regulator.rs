//! The policy gate capability and its installed handle

use std::fmt;
use std::sync::Arc;

use lib_types::{Address, Amount};

use crate::status::StatusCode;

/// Policy gate consulted before every ordinary transfer
///
/// Implementations must be total: always return a [`StatusCode`], never
/// panic. They may read their own state (a deadline, an allowlist) but must
/// not depend on ledger state. The ledger treats every implementation as
/// untrusted and refuses re-entry while `verify_transfer` is running.
pub trait TransferRegulator: Send + Sync {
    /// Evaluate a proposed transfer of `amount` from `from` to `to`
    fn verify_transfer(&self, from: &Address, to: &Address, amount: Amount) -> StatusCode;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// An installed regulator: the address it is known by plus a shared handle
///
/// Cloning is cheap. Replacing the active regulator only drops the ledger's
/// handle; other holders keep the implementation alive.
#[derive(Clone)]
pub struct RegulatorRef {
    address: Address,
    inner: Arc<dyn TransferRegulator>,
}

impl RegulatorRef {
    /// Wrap a regulator installed at `address`
    pub fn new(address: Address, regulator: impl TransferRegulator + 'static) -> Self {
        Self {
            address,
            inner: Arc::new(regulator),
        }
    }

    /// Wrap an already shared regulator
    pub fn from_arc(address: Address, regulator: Arc<dyn TransferRegulator>) -> Self {
        Self {
            address,
            inner: regulator,
        }
    }

    /// Address the regulator is installed at
    pub fn address(&self) -> Address {
        self.address
    }

    /// Regulator name for logs
    pub fn name(&self) -> &'static str {
        self.inner.name()
    }

    /// Evaluate a transfer against this regulator
    pub fn verify_transfer(&self, from: &Address, to: &Address, amount: Amount) -> StatusCode {
        self.inner.verify_transfer(from, to, amount)
    }
}

impl fmt::Debug for RegulatorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegulatorRef")
            .field("address", &self.address)
            .field("name", &self.inner.name())
            .finish()
    }
}
