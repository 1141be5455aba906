//! Governance Controller
//!
//! Owner identity plus the active regulator, with the owner-only operations
//! that change them.

use tracing::{info, warn};

use lib_regulator::RegulatorRef;
use lib_types::Address;

use crate::errors::{GovernanceError, GovernanceResult};

/// Owner and active regulator of a single ledger instance
#[derive(Debug, Clone)]
pub struct GovernanceController {
    owner: Address,
    regulator: RegulatorRef,
}

impl GovernanceController {
    /// Create governance state owned by `owner` with `regulator` active
    pub fn new(owner: Address, regulator: RegulatorRef) -> GovernanceResult<Self> {
        if owner.is_zero() {
            return Err(GovernanceError::InvalidOwner);
        }
        Ok(Self { owner, regulator })
    }

    /// Current owner
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Currently installed regulator
    pub fn regulator(&self) -> &RegulatorRef {
        &self.regulator
    }

    /// Check if `caller` is the owner
    pub fn is_owner(&self, caller: &Address) -> bool {
        *caller == self.owner
    }

    /// Fail with `Unauthorized` unless `caller` is the owner
    pub fn ensure_owner(&self, caller: &Address) -> GovernanceResult<()> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            warn!(caller = %caller, "owner-only operation attempted by non-owner");
            Err(GovernanceError::Unauthorized { caller: *caller })
        }
    }

    /// Install `new_regulator`, returning the one it replaced
    ///
    /// Takes effect for the next ledger operation.
    pub fn replace_regulator(
        &mut self,
        caller: &Address,
        new_regulator: RegulatorRef,
    ) -> GovernanceResult<RegulatorRef> {
        self.ensure_owner(caller)?;

        let previous = std::mem::replace(&mut self.regulator, new_regulator);
        info!(
            previous = %previous.address(),
            current = %self.regulator.address(),
            regulator = self.regulator.name(),
            "regulator replaced"
        );
        Ok(previous)
    }

    /// Hand ownership to `new_owner`, returning the previous owner
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> GovernanceResult<Address> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(GovernanceError::InvalidOwner);
        }

        let previous = std::mem::replace(&mut self.owner, new_owner);
        info!(previous = %previous, current = %new_owner, "ownership transferred");
        Ok(previous)
    }
}
