//! Shared, Re-entry Guarded Ledger Handle
//!
//! Operations from different threads are serialised by a reentrant mutex.
//! A second call on the thread that already holds the lock (for example a
//! regulator calling back into the ledger from `verify_transfer`) finds the
//! ledger borrowed and fails with [`TokenError::Reentrancy`] instead of
//! observing or mutating a half-applied operation.

use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::sync::Arc;
use tracing::{debug, warn};

use lib_regulator::{RegulatorRef, StatusCode};
use lib_types::{Address, Amount};

use crate::errors::{TokenError, TokenResult};
use crate::events::TokenEvent;
use crate::token::{RegulatedToken, TokenSnapshot};

/// Cloneable handle to a single [`RegulatedToken`]
#[derive(Clone)]
pub struct SharedToken {
    inner: Arc<ReentrantMutex<RefCell<RegulatedToken>>>,
}

impl std::fmt::Debug for SharedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedToken").finish()
    }
}

impl SharedToken {
    /// Wrap a ledger for shared use
    pub fn new(token: RegulatedToken) -> Self {
        Self {
            inner: Arc::new(ReentrantMutex::new(RefCell::new(token))),
        }
    }

    /// Run a read against the ledger
    pub fn read<R>(&self, f: impl FnOnce(&RegulatedToken) -> R) -> TokenResult<R> {
        let guard = self.inner.lock();
        let token = guard.try_borrow().map_err(|_| {
            warn!("ledger read attempted while an operation is in progress");
            TokenError::Reentrancy
        })?;
        Ok(f(&token))
    }

    /// Run a mutating closure against the ledger as one unit
    ///
    /// If the closure returns `Err`, every change it made (balances,
    /// allowances, governance, audit records) is rolled back before the
    /// error is returned.
    pub fn write<R>(
        &self,
        f: impl FnOnce(&mut RegulatedToken) -> TokenResult<R>,
    ) -> TokenResult<R> {
        let guard = self.inner.lock();
        let mut token = guard.try_borrow_mut().map_err(|_| {
            warn!("re-entrant ledger operation rejected");
            TokenError::Reentrancy
        })?;

        let before = token.clone();
        match f(&mut token) {
            Ok(value) => Ok(value),
            Err(e) => {
                debug!(error = %e, "ledger write failed, state restored");
                *token = before;
                Err(e)
            }
        }
    }

    pub fn balance_of(&self, account: &Address) -> TokenResult<Amount> {
        self.read(|t| t.balance_of(account))
    }

    pub fn total_supply(&self) -> TokenResult<Amount> {
        self.read(|t| t.total_supply())
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> TokenResult<Amount> {
        self.read(|t| t.allowance(owner, spender))
    }

    pub fn owner(&self) -> TokenResult<Address> {
        self.read(|t| t.owner())
    }

    pub fn regulator(&self) -> TokenResult<Address> {
        self.read(|t| t.regulator())
    }

    pub fn verify_transfer(&self, from: &Address, to: &Address, amount: Amount) -> TokenResult<StatusCode> {
        self.read(|t| t.verify_transfer(from, to, amount))
    }

    pub fn snapshot(&self) -> TokenResult<TokenSnapshot> {
        self.read(|t| t.snapshot())
    }

    pub fn events(&self) -> TokenResult<Vec<TokenEvent>> {
        self.read(|t| t.events().to_vec())
    }

    pub fn transfer(&self, caller: &Address, to: &Address, amount: Amount) -> TokenResult<bool> {
        self.write(|t| t.transfer(caller, to, amount))
    }

    pub fn approve(&self, caller: &Address, spender: &Address, amount: Amount) -> TokenResult<bool> {
        self.write(|t| t.approve(caller, spender, amount))
    }

    pub fn transfer_from(
        &self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> TokenResult<bool> {
        self.write(|t| t.transfer_from(caller, from, to, amount))
    }

    pub fn mint(&self, caller: &Address, to: &Address, amount: Amount) -> TokenResult<bool> {
        self.write(|t| t.mint(caller, to, amount))
    }

    pub fn burn(&self, caller: &Address, from: &Address, amount: Amount) -> TokenResult<()> {
        self.write(|t| t.burn(caller, from, amount))
    }

    pub fn forced_transfer(
        &self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> TokenResult<bool> {
        self.write(|t| t.forced_transfer(caller, from, to, amount))
    }

    pub fn replace_regulator(&self, caller: &Address, regulator: RegulatorRef) -> TokenResult<()> {
        self.write(|t| t.replace_regulator(caller, regulator))
    }

    pub fn transfer_ownership(&self, caller: &Address, new_owner: Address) -> TokenResult<()> {
        self.write(|t| t.transfer_ownership(caller, new_owner))
    }
}
