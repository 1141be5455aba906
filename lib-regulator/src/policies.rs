//! Reference regulators

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashSet;

use lib_types::{Address, Amount};

use crate::regulator::TransferRegulator;
use crate::status::StatusCode;

// =============================================================================
// LOCKUP
// =============================================================================

/// Rejects every transfer while the lockup holds
///
/// The default regulator installed at construction is
/// [`LockupPolicy::indefinite`], which never releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockupPolicy {
    release_at: Option<DateTime<Utc>>,
}

impl LockupPolicy {
    /// Lockup that never releases
    pub fn indefinite() -> Self {
        Self { release_at: None }
    }

    /// Lockup that releases at `release_at`
    pub fn until(release_at: DateTime<Utc>) -> Self {
        Self {
            release_at: Some(release_at),
        }
    }

    /// Release instant, if any
    pub fn release_at(&self) -> Option<DateTime<Utc>> {
        self.release_at
    }

    /// Whether the lockup holds at `now`
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        match self.release_at {
            None => true,
            Some(release_at) => now < release_at,
        }
    }
}

impl TransferRegulator for LockupPolicy {
    fn verify_transfer(&self, _from: &Address, _to: &Address, _amount: Amount) -> StatusCode {
        if self.is_locked_at(Utc::now()) {
            StatusCode::LOCKED
        } else {
            StatusCode::SUCCESS
        }
    }

    fn name(&self) -> &'static str {
        "lockup"
    }
}

// =============================================================================
// PERMISSIVE
// =============================================================================

/// Approves every transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PermissivePolicy;

impl TransferRegulator for PermissivePolicy {
    fn verify_transfer(&self, _from: &Address, _to: &Address, _amount: Amount) -> StatusCode {
        StatusCode::SUCCESS
    }

    fn name(&self) -> &'static str {
        "permissive"
    }
}

// =============================================================================
// ALLOWLIST
// =============================================================================

/// Approves transfers only between allowlisted addresses
///
/// The list belongs to the regulator, not the ledger, and can be edited while
/// the regulator is installed.
#[derive(Debug, Default)]
pub struct AllowlistPolicy {
    allowlist: RwLock<HashSet<Address>>,
}

impl AllowlistPolicy {
    /// Create an empty allowlist
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an allowlist seeded with `addresses`
    pub fn with_addresses(addresses: impl IntoIterator<Item = Address>) -> Self {
        Self {
            allowlist: RwLock::new(addresses.into_iter().collect()),
        }
    }

    /// Add an address; returns false if it was already listed
    pub fn allow(&self, address: Address) -> bool {
        self.allowlist.write().insert(address)
    }

    /// Remove an address; returns false if it was not listed
    pub fn revoke(&self, address: &Address) -> bool {
        self.allowlist.write().remove(address)
    }

    /// Check if an address is listed
    pub fn is_allowed(&self, address: &Address) -> bool {
        self.allowlist.read().contains(address)
    }
}

impl TransferRegulator for AllowlistPolicy {
    fn verify_transfer(&self, from: &Address, to: &Address, _amount: Amount) -> StatusCode {
        let allowlist = self.allowlist.read();
        if allowlist.contains(from) && allowlist.contains(to) {
            StatusCode::SUCCESS
        } else {
            StatusCode::NOT_ALLOWLISTED
        }
    }

    fn name(&self) -> &'static str {
        "allowlist"
    }
}
