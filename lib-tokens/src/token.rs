//! Regulated Token Ledger
//!
//! Balances, allowances and supply, with every ordinary transfer gated by the
//! active regulator and every administrative action gated by the owner.
//!
//! # Operation shape
//!
//! Each mutating operation runs in three phases:
//!
//! 1. **Checks**: authorization, balances, allowances, then the regulator
//! 2. **Effects**: new values are computed with checked arithmetic first and
//!    only then written, so no failure can leave a partial update
//! 3. **Record**: the audit event is appended last
//!
//! The regulator is called while `&mut self` is held; it has no path back
//! into this instance. Shared access goes through
//! [`SharedToken`](crate::SharedToken), which rejects re-entry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use lib_governance::GovernanceController;
use lib_regulator::{RegulatorRef, StatusCode};
use lib_types::{Address, Amount};

use crate::errors::{TokenError, TokenResult};
use crate::events::TokenEvent;

// =============================================================================
// METADATA
// =============================================================================

/// Display metadata for the token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Human-readable token name
    pub name: String,
    /// Token symbol
    pub symbol: String,
    /// Number of decimal places (display only)
    pub decimals: u8,
}

impl Default for TokenMetadata {
    fn default() -> Self {
        Self {
            name: "Regulated Token".to_string(),
            symbol: "RGT".to_string(),
            decimals: 18,
        }
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// One allowance entry in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceEntry {
    pub owner: Address,
    pub spender: Address,
    pub amount: Amount,
}

/// Serializable copy of the persisted ledger state
///
/// Zero balances and zero allowances are omitted; entries are sorted by
/// address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub metadata: TokenMetadata,
    pub balances: Vec<(Address, Amount)>,
    pub allowances: Vec<AllowanceEntry>,
    pub total_supply: Amount,
    pub owner: Address,
    pub regulator: Address,
}

// =============================================================================
// LEDGER
// =============================================================================

/// Token ledger gated by a replaceable regulator
#[derive(Debug, Clone)]
pub struct RegulatedToken {
    metadata: TokenMetadata,
    balances: BTreeMap<Address, Amount>,
    allowances: BTreeMap<Address, BTreeMap<Address, Amount>>,
    total_supply: Amount,
    governance: GovernanceController,
    events: Vec<TokenEvent>,
}

impl RegulatedToken {
    /// Create a ledger owned by `caller`
    ///
    /// `holders[i]` receives `balances[i]`; repeated holders accumulate. The
    /// initial supply is the sum of `balances`.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument`: length mismatch, or `caller` is the zero address
    /// - `Overflow`: the balances do not fit in an [`Amount`]
    pub fn new(
        caller: Address,
        regulator: RegulatorRef,
        holders: &[Address],
        balances: &[Amount],
    ) -> TokenResult<Self> {
        Self::with_metadata(caller, regulator, holders, balances, TokenMetadata::default())
    }

    /// Same as [`RegulatedToken::new`] with explicit metadata
    pub fn with_metadata(
        caller: Address,
        regulator: RegulatorRef,
        holders: &[Address],
        balances: &[Amount],
        metadata: TokenMetadata,
    ) -> TokenResult<Self> {
        if holders.len() != balances.len() {
            return Err(TokenError::InvalidArgument(format!(
                "holders ({}) and balances ({}) must have equal length",
                holders.len(),
                balances.len()
            )));
        }

        let governance = GovernanceController::new(caller, regulator)?;

        let mut ledger: BTreeMap<Address, Amount> = BTreeMap::new();
        let mut total_supply: Amount = 0;
        let mut events = Vec::new();

        for (holder, &amount) in holders.iter().zip(balances) {
            if amount == 0 {
                continue;
            }
            let entry = ledger.entry(*holder).or_insert(0);
            *entry = entry.checked_add(amount).ok_or(TokenError::Overflow)?;
            total_supply = total_supply.checked_add(amount).ok_or(TokenError::Overflow)?;
            events.push(TokenEvent::Mint { to: *holder, amount });
        }

        info!(
            owner = %caller,
            regulator = governance.regulator().name(),
            holders = ledger.len(),
            total_supply,
            "regulated token created"
        );

        Ok(Self {
            metadata,
            balances: ledger,
            allowances: BTreeMap::new(),
            total_supply,
            governance,
            events,
        })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Token metadata
    pub fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    /// Balance of an account
    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Total supply in circulation
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Remaining allowance `owner` granted to `spender`
    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Current owner
    pub fn owner(&self) -> Address {
        self.governance.owner()
    }

    /// Address of the active regulator
    pub fn regulator(&self) -> Address {
        self.governance.regulator().address()
    }

    /// Ask the active regulator about a transfer without executing it
    pub fn verify_transfer(&self, from: &Address, to: &Address, amount: Amount) -> StatusCode {
        self.governance.regulator().verify_transfer(from, to, amount)
    }

    /// Audit records committed so far
    pub fn events(&self) -> &[TokenEvent] {
        &self.events
    }

    /// Take the audit records committed so far, leaving the journal empty
    pub fn drain_events(&mut self) -> Vec<TokenEvent> {
        std::mem::take(&mut self.events)
    }

    // =========================================================================
    // Regulated operations
    // =========================================================================

    /// Transfer `amount` from `caller` to `to`
    ///
    /// # Errors
    ///
    /// - `InsufficientBalance`: caller holds less than `amount`
    /// - `PolicyRejected`: the active regulator did not approve
    pub fn transfer(&mut self, caller: &Address, to: &Address, amount: Amount) -> TokenResult<bool> {
        self.ensure_balance(caller, amount)?;
        self.ensure_approved(caller, to, amount)?;

        self.apply_move(caller, to, amount)?;

        debug!(from = %caller, to = %to, amount, "transfer committed");
        self.events.push(TokenEvent::Transfer {
            from: *caller,
            to: *to,
            amount,
        });
        Ok(true)
    }

    /// Set the allowance `caller` grants `spender`
    ///
    /// Not regulated: it moves no value.
    pub fn approve(&mut self, caller: &Address, spender: &Address, amount: Amount) -> TokenResult<bool> {
        self.set_allowance(caller, spender, amount);

        debug!(owner = %caller, spender = %spender, amount, "approval committed");
        self.events.push(TokenEvent::Approval {
            owner: *caller,
            spender: *spender,
            amount,
        });
        Ok(true)
    }

    /// Move `amount` from `from` to `to` using the allowance `from` granted `caller`
    ///
    /// # Errors
    ///
    /// - `InsufficientAllowance`: allowance below `amount`
    /// - `InsufficientBalance`: `from` holds less than `amount`
    /// - `PolicyRejected`: the regulator rejected `from` -> `to`
    pub fn transfer_from(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> TokenResult<bool> {
        let allowance = self.allowance(from, caller);
        if allowance < amount {
            return Err(TokenError::InsufficientAllowance {
                have: allowance,
                need: amount,
            });
        }
        self.ensure_balance(from, amount)?;
        self.ensure_approved(from, to, amount)?;

        // Allowance cannot underflow: checked above
        let remaining = allowance - amount;
        self.apply_move(from, to, amount)?;
        self.set_allowance(from, caller, remaining);

        debug!(spender = %caller, from = %from, to = %to, amount, "transfer_from committed");
        self.events.push(TokenEvent::Transfer {
            from: *from,
            to: *to,
            amount,
        });
        Ok(true)
    }

    // =========================================================================
    // Owner operations
    // =========================================================================

    /// Issue `amount` new tokens to `to` (owner only, not regulated)
    pub fn mint(&mut self, caller: &Address, to: &Address, amount: Amount) -> TokenResult<bool> {
        self.governance.ensure_owner(caller)?;

        let new_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;

        self.set_balance(to, new_balance);
        self.total_supply = new_supply;

        info!(to = %to, amount, total_supply = new_supply, "mint committed");
        self.events.push(TokenEvent::Mint { to: *to, amount });
        Ok(true)
    }

    /// Destroy `amount` tokens held by `from` (owner only)
    pub fn burn(&mut self, caller: &Address, from: &Address, amount: Amount) -> TokenResult<()> {
        self.governance.ensure_owner(caller)?;
        let balance = self.ensure_balance(from, amount)?;

        let new_supply = self.total_supply.checked_sub(amount).ok_or_else(|| {
            TokenError::ConservationViolated(format!(
                "burn of {} exceeds total supply {}",
                amount, self.total_supply
            ))
        })?;

        self.set_balance(from, balance - amount);
        self.total_supply = new_supply;

        info!(from = %from, amount, total_supply = new_supply, "burn committed");
        self.events.push(TokenEvent::Burn { from: *from, amount });
        Ok(())
    }

    /// Move `amount` from `from` to `to` without consulting the regulator (owner only)
    pub fn forced_transfer(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> TokenResult<bool> {
        self.governance.ensure_owner(caller)?;
        self.ensure_balance(from, amount)?;

        self.apply_move(from, to, amount)?;

        info!(operator = %caller, from = %from, to = %to, amount, "forced transfer committed");
        self.events.push(TokenEvent::ForcedTransfer {
            operator: *caller,
            from: *from,
            to: *to,
            amount,
        });
        Ok(true)
    }

    /// Install a new regulator (owner only); effective for the next call
    pub fn replace_regulator(&mut self, caller: &Address, regulator: RegulatorRef) -> TokenResult<()> {
        let previous = self.governance.replace_regulator(caller, regulator)?;

        self.events.push(TokenEvent::RegulatorReplaced {
            previous: previous.address(),
            current: self.regulator(),
        });
        Ok(())
    }

    /// Hand ownership to `new_owner` (owner only); effective immediately
    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> TokenResult<()> {
        let previous = self.governance.transfer_ownership(caller, new_owner)?;

        self.events.push(TokenEvent::OwnershipTransferred {
            previous,
            current: new_owner,
        });
        Ok(())
    }

    // =========================================================================
    // Invariants and persistence
    // =========================================================================

    /// Verify that the balances sum to the total supply
    pub fn check_supply_invariant(&self) -> TokenResult<()> {
        let sum = self
            .balances
            .values()
            .try_fold(0 as Amount, |acc, &b| acc.checked_add(b))
            .ok_or_else(|| TokenError::ConservationViolated("balance sum overflows".to_string()))?;

        if sum != self.total_supply {
            return Err(TokenError::ConservationViolated(format!(
                "sum of balances ({}) != total supply ({})",
                sum, self.total_supply
            )));
        }
        Ok(())
    }

    /// Copy the persisted state into a serializable snapshot
    pub fn snapshot(&self) -> TokenSnapshot {
        let balances = self.balances.iter().map(|(a, b)| (*a, *b)).collect();
        let allowances = self
            .allowances
            .iter()
            .flat_map(|(owner, spenders)| {
                spenders.iter().map(move |(spender, amount)| AllowanceEntry {
                    owner: *owner,
                    spender: *spender,
                    amount: *amount,
                })
            })
            .collect();

        TokenSnapshot {
            metadata: self.metadata.clone(),
            balances,
            allowances,
            total_supply: self.total_supply,
            owner: self.owner(),
            regulator: self.regulator(),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Fail unless `account` holds at least `amount`; returns the balance
    fn ensure_balance(&self, account: &Address, amount: Amount) -> TokenResult<Amount> {
        let balance = self.balance_of(account);
        if balance < amount {
            return Err(TokenError::InsufficientBalance {
                have: balance,
                need: amount,
            });
        }
        Ok(balance)
    }

    /// Fail unless the active regulator approves `from` -> `to`
    fn ensure_approved(&self, from: &Address, to: &Address, amount: Amount) -> TokenResult<()> {
        let regulator = self.governance.regulator();
        let code = regulator.verify_transfer(from, to, amount);
        if code.is_success() {
            return Ok(());
        }

        warn!(
            from = %from,
            to = %to,
            amount,
            code = %code,
            regulator = regulator.name(),
            "transfer rejected by regulator"
        );
        Err(TokenError::rejected(code))
    }

    /// Move a checked amount; both new balances are computed before writing
    fn apply_move(&mut self, from: &Address, to: &Address, amount: Amount) -> TokenResult<()> {
        if from == to {
            return Ok(());
        }

        let new_from = self
            .balance_of(from)
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance {
                have: self.balance_of(from),
                need: amount,
            })?;
        let new_to = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;

        self.set_balance(from, new_from);
        self.set_balance(to, new_to);
        Ok(())
    }

    fn set_balance(&mut self, account: &Address, amount: Amount) {
        if amount == 0 {
            self.balances.remove(account);
        } else {
            self.balances.insert(*account, amount);
        }
    }

    fn set_allowance(&mut self, owner: &Address, spender: &Address, amount: Amount) {
        if amount == 0 {
            if let Some(spenders) = self.allowances.get_mut(owner) {
                spenders.remove(spender);
                if spenders.is_empty() {
                    self.allowances.remove(owner);
                }
            }
        } else {
            self.allowances
                .entry(*owner)
                .or_default()
                .insert(*spender, amount);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_regulator::{AllowlistPolicy, LockupPolicy, PermissivePolicy};

    fn owner() -> Address {
        Address::new([1u8; 32])
    }

    fn alice() -> Address {
        Address::new([2u8; 32])
    }

    fn bob() -> Address {
        Address::new([3u8; 32])
    }

    fn lockup() -> RegulatorRef {
        RegulatorRef::new(Address::new([0xa0; 32]), LockupPolicy::indefinite())
    }

    fn permissive() -> RegulatorRef {
        RegulatorRef::new(Address::new([0xa1; 32]), PermissivePolicy)
    }

    fn create_test_token(regulator: RegulatorRef) -> RegulatedToken {
        RegulatedToken::new(owner(), regulator, &[alice(), bob()], &[10_000, 500]).unwrap()
    }

    #[test]
    fn test_genesis_allocations() {
        let token = create_test_token(lockup());

        assert_eq!(token.balance_of(&alice()), 10_000);
        assert_eq!(token.balance_of(&bob()), 500);
        assert_eq!(token.total_supply(), 10_500);
        assert_eq!(token.owner(), owner());
        assert_eq!(token.regulator(), lockup().address());
        assert_eq!(token.events().len(), 2);
        token.check_supply_invariant().unwrap();
    }

    #[test]
    fn test_genesis_rejects_length_mismatch() {
        let result = RegulatedToken::new(owner(), lockup(), &[alice(), bob()], &[1]);
        assert!(matches!(result, Err(TokenError::InvalidArgument(_))));
    }

    #[test]
    fn test_genesis_rejects_zero_owner() {
        let result = RegulatedToken::new(Address::zero(), lockup(), &[], &[]);
        assert!(matches!(result, Err(TokenError::InvalidArgument(_))));
    }

    #[test]
    fn test_genesis_duplicate_holders_accumulate() {
        let token =
            RegulatedToken::new(owner(), lockup(), &[alice(), alice()], &[100, 50]).unwrap();
        assert_eq!(token.balance_of(&alice()), 150);
        assert_eq!(token.total_supply(), 150);
    }

    #[test]
    fn test_genesis_overflow() {
        let result = RegulatedToken::new(
            owner(),
            lockup(),
            &[alice(), bob()],
            &[Amount::MAX, 1],
        );
        assert_eq!(result.unwrap_err(), TokenError::Overflow);
    }

    #[test]
    fn test_transfer_under_permissive() {
        let mut token = create_test_token(permissive());

        assert!(token.transfer(&alice(), &bob(), 1_000).unwrap());

        assert_eq!(token.balance_of(&alice()), 9_000);
        assert_eq!(token.balance_of(&bob()), 1_500);
        assert_eq!(
            token.events().last(),
            Some(&TokenEvent::Transfer {
                from: alice(),
                to: bob(),
                amount: 1_000
            })
        );
        token.check_supply_invariant().unwrap();
    }

    #[test]
    fn test_transfer_rejected_by_lockup() {
        let mut token = create_test_token(lockup());
        let before = token.snapshot();
        let events_before = token.events().len();

        let result = token.transfer(&alice(), &bob(), 1_000);

        assert!(matches!(
            result,
            Err(TokenError::PolicyRejected { code: StatusCode::LOCKED, .. })
        ));
        assert_eq!(token.snapshot(), before);
        assert_eq!(token.events().len(), events_before);
    }

    #[test]
    fn test_insufficient_balance_reported_before_policy() {
        let mut token = create_test_token(lockup());

        let result = token.transfer(&bob(), &alice(), 501);

        assert_eq!(
            result.unwrap_err(),
            TokenError::InsufficientBalance { have: 500, need: 501 }
        );
    }

    #[test]
    fn test_self_transfer_keeps_balance() {
        let mut token = create_test_token(permissive());

        token.transfer(&alice(), &alice(), 1_000).unwrap();

        assert_eq!(token.balance_of(&alice()), 10_000);
        token.check_supply_invariant().unwrap();
    }

    #[test]
    fn test_transfer_from_consumes_allowance() {
        let mut token = create_test_token(permissive());

        token.approve(&alice(), &owner(), 1_000).unwrap();
        assert_eq!(token.allowance(&alice(), &owner()), 1_000);

        token.transfer_from(&owner(), &alice(), &bob(), 400).unwrap();

        assert_eq!(token.allowance(&alice(), &owner()), 600);
        assert_eq!(token.balance_of(&alice()), 9_600);
        assert_eq!(token.balance_of(&bob()), 900);
    }

    #[test]
    fn test_transfer_from_insufficient_allowance() {
        let mut token = create_test_token(permissive());
        token.approve(&alice(), &owner(), 100).unwrap();

        let result = token.transfer_from(&owner(), &alice(), &bob(), 101);

        assert_eq!(
            result.unwrap_err(),
            TokenError::InsufficientAllowance { have: 100, need: 101 }
        );
        assert_eq!(token.allowance(&alice(), &owner()), 100);
    }

    #[test]
    fn test_transfer_from_insufficient_balance_keeps_allowance() {
        let mut token = create_test_token(permissive());
        token.approve(&bob(), &owner(), 1_000).unwrap();

        let result = token.transfer_from(&owner(), &bob(), &alice(), 600);

        assert!(matches!(result, Err(TokenError::InsufficientBalance { .. })));
        assert_eq!(token.allowance(&bob(), &owner()), 1_000);
    }

    #[test]
    fn test_transfer_from_uses_from_as_sender() {
        let allowlist = AllowlistPolicy::with_addresses([alice(), bob()]);
        let mut token = create_test_token(RegulatorRef::new(Address::new([0xa2; 32]), allowlist));
        token.approve(&alice(), &owner(), 1_000).unwrap();

        // Owner is the spender but not allowlisted; only from/to are evaluated
        token.transfer_from(&owner(), &alice(), &bob(), 1_000).unwrap();
        assert_eq!(token.balance_of(&bob()), 1_500);

        token.approve(&alice(), &owner(), 1_000).unwrap();
        let result = token.transfer_from(&owner(), &alice(), &owner(), 1_000);
        assert!(matches!(
            result,
            Err(TokenError::PolicyRejected { code: StatusCode::NOT_ALLOWLISTED, .. })
        ));
    }

    #[test]
    fn test_approve_overwrites_and_clears() {
        let mut token = create_test_token(lockup());

        token.approve(&alice(), &bob(), 700).unwrap();
        token.approve(&alice(), &bob(), 300).unwrap();
        assert_eq!(token.allowance(&alice(), &bob()), 300);

        token.approve(&alice(), &bob(), 0).unwrap();
        assert_eq!(token.allowance(&alice(), &bob()), 0);
        assert!(token.snapshot().allowances.is_empty());
    }

    #[test]
    fn test_mint_and_burn() {
        let mut token = create_test_token(lockup());

        token.mint(&owner(), &owner(), 500).unwrap();
        assert_eq!(token.balance_of(&owner()), 500);
        assert_eq!(token.total_supply(), 11_000);

        token.burn(&owner(), &owner(), 500).unwrap();
        assert_eq!(token.balance_of(&owner()), 0);
        assert_eq!(token.total_supply(), 10_500);

        let result = token.burn(&owner(), &owner(), 1);
        assert!(matches!(result, Err(TokenError::InsufficientBalance { .. })));
        token.check_supply_invariant().unwrap();
    }

    #[test]
    fn test_mint_overflow_leaves_state() {
        let mut token = create_test_token(lockup());
        let before = token.snapshot();

        let result = token.mint(&owner(), &alice(), Amount::MAX);

        assert_eq!(result.unwrap_err(), TokenError::Overflow);
        assert_eq!(token.snapshot(), before);
    }

    #[test]
    fn test_owner_operations_reject_strangers() {
        let mut token = create_test_token(lockup());
        let before = token.snapshot();
        let unauthorized = TokenError::Unauthorized { caller: alice() };

        assert_eq!(token.mint(&alice(), &alice(), 1).unwrap_err(), unauthorized);
        assert_eq!(token.burn(&alice(), &bob(), 1).unwrap_err(), unauthorized);
        assert_eq!(
            token.forced_transfer(&alice(), &bob(), &alice(), 1).unwrap_err(),
            unauthorized
        );
        assert_eq!(
            token.replace_regulator(&alice(), permissive()).unwrap_err(),
            unauthorized
        );
        assert_eq!(
            token.transfer_ownership(&alice(), alice()).unwrap_err(),
            unauthorized
        );

        assert_eq!(token.snapshot(), before);
    }

    #[test]
    fn test_forced_transfer_bypasses_regulator() {
        let mut token = create_test_token(lockup());

        assert!(token.forced_transfer(&owner(), &alice(), &bob(), 1_000).unwrap());

        assert_eq!(token.balance_of(&alice()), 9_000);
        assert_eq!(token.balance_of(&bob()), 1_500);
        assert_eq!(
            token.events().last(),
            Some(&TokenEvent::ForcedTransfer {
                operator: owner(),
                from: alice(),
                to: bob(),
                amount: 1_000
            })
        );

        let result = token.forced_transfer(&owner(), &bob(), &alice(), 10_000);
        assert!(matches!(result, Err(TokenError::InsufficientBalance { .. })));
    }

    #[test]
    fn test_replace_regulator_records_event() {
        let mut token = create_test_token(lockup());

        token.replace_regulator(&owner(), permissive()).unwrap();

        assert_eq!(token.regulator(), permissive().address());
        assert_eq!(
            token.events().last(),
            Some(&TokenEvent::RegulatorReplaced {
                previous: lockup().address(),
                current: permissive().address()
            })
        );
    }

    #[test]
    fn test_transfer_ownership_to_zero_rejected() {
        let mut token = create_test_token(lockup());

        let result = token.transfer_ownership(&owner(), Address::zero());

        assert!(matches!(result, Err(TokenError::InvalidArgument(_))));
        assert_eq!(token.owner(), owner());
    }

    #[test]
    fn test_drain_events() {
        let mut token = create_test_token(permissive());
        token.transfer(&alice(), &bob(), 1).unwrap();

        let drained = token.drain_events();
        assert_eq!(drained.len(), 3);
        assert!(token.events().is_empty());
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut token = create_test_token(permissive());
        token.approve(&alice(), &bob(), 42).unwrap();

        let snapshot = token.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: TokenSnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, snapshot);
        assert_eq!(restored.allowances.len(), 1);
        assert_eq!(restored.total_supply, 10_500);
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn carol() -> Address {
            Address::new([4u8; 32])
        }

        fn allowlist() -> RegulatorRef {
            RegulatorRef::new(
                Address::new([0xa2; 32]),
                AllowlistPolicy::with_addresses([alice(), bob()]),
            )
        }

        #[derive(Debug, Clone)]
        enum Op {
            Transfer(Address, Address, Amount),
            Approve(Address, Address, Amount),
            TransferFrom(Address, Address, Address, Amount),
            Mint(Address, Address, Amount),
            Burn(Address, Address, Amount),
            ForcedTransfer(Address, Address, Address, Amount),
            ReplaceRegulator(Address, RegulatorRef),
        }

        fn apply(token: &mut RegulatedToken, op: &Op) -> TokenResult<()> {
            match op.clone() {
                Op::Transfer(caller, to, amount) => token.transfer(&caller, &to, amount).map(|_| ()),
                Op::Approve(caller, spender, amount) => {
                    token.approve(&caller, &spender, amount).map(|_| ())
                }
                Op::TransferFrom(caller, from, to, amount) => {
                    token.transfer_from(&caller, &from, &to, amount).map(|_| ())
                }
                Op::Mint(caller, to, amount) => token.mint(&caller, &to, amount).map(|_| ()),
                Op::Burn(caller, from, amount) => token.burn(&caller, &from, amount),
                Op::ForcedTransfer(caller, from, to, amount) => {
                    token.forced_transfer(&caller, &from, &to, amount).map(|_| ())
                }
                Op::ReplaceRegulator(caller, regulator) => token.replace_regulator(&caller, regulator),
            }
        }

        fn account() -> impl Strategy<Value = Address> {
            prop_oneof![Just(owner()), Just(alice()), Just(bob()), Just(carol())]
        }

        fn amount() -> impl Strategy<Value = Amount> {
            prop_oneof![0u128..=600, 0u128..=12_000]
        }

        fn regulator() -> impl Strategy<Value = RegulatorRef> {
            prop_oneof![Just(lockup()), Just(permissive()), Just(allowlist())]
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (account(), account(), amount()).prop_map(|(c, t, a)| Op::Transfer(c, t, a)),
                (account(), account(), amount()).prop_map(|(c, s, a)| Op::Approve(c, s, a)),
                (account(), account(), account(), amount())
                    .prop_map(|(c, f, t, a)| Op::TransferFrom(c, f, t, a)),
                (account(), account(), amount()).prop_map(|(c, t, a)| Op::Mint(c, t, a)),
                (account(), account(), amount()).prop_map(|(c, f, a)| Op::Burn(c, f, a)),
                (account(), account(), account(), amount())
                    .prop_map(|(c, f, t, a)| Op::ForcedTransfer(c, f, t, a)),
                (account(), regulator()).prop_map(|(c, r)| Op::ReplaceRegulator(c, r)),
            ]
        }

        /// Supply is conserved after every step, and a failed step changes nothing
        proptest! {
            #[test]
            fn prop_random_operations_are_atomic(
                initial in regulator(),
                ops in prop::collection::vec(op(), 1..48),
            ) {
                let mut token = create_test_token(initial);

                for op in &ops {
                    let before = token.snapshot();
                    let events_before = token.events().len();

                    match apply(&mut token, op) {
                        Ok(()) => {
                            prop_assert_eq!(token.events().len(), events_before + 1);
                        }
                        Err(_) => {
                            prop_assert_eq!(token.snapshot(), before);
                            prop_assert_eq!(token.events().len(), events_before);
                        }
                    }
                    prop_assert!(token.check_supply_invariant().is_ok());
                }
            }
        }

        /// Any amount above the sender's balance fails, whatever the regulator
        proptest! {
            #[test]
            fn prop_transfer_above_balance_fails(
                initial in regulator(),
                to in account(),
                excess in 1u128..=(u128::MAX - 10_000),
            ) {
                let mut token = create_test_token(initial);
                let before = token.snapshot();
                let need = 10_000 + excess;

                let err = token.transfer(&alice(), &to, need).unwrap_err();

                prop_assert_eq!(err, TokenError::InsufficientBalance { have: 10_000, need });
                prop_assert_eq!(token.snapshot(), before);
            }
        }

        /// A spender can never move more than the allowance it was granted
        proptest! {
            #[test]
            fn prop_transfer_from_bounded_by_allowance(
                granted in 0u128..=10_000,
                requested in 0u128..=10_000,
            ) {
                let mut token = create_test_token(permissive());
                token.approve(&alice(), &bob(), granted).unwrap();

                let result = token.transfer_from(&bob(), &alice(), &carol(), requested);

                if requested <= granted {
                    prop_assert!(result.is_ok());
                    prop_assert_eq!(token.allowance(&alice(), &bob()), granted - requested);
                    prop_assert_eq!(token.balance_of(&carol()), requested);
                } else {
                    prop_assert_eq!(
                        result.unwrap_err(),
                        TokenError::InsufficientAllowance { have: granted, need: requested }
                    );
                    prop_assert_eq!(token.allowance(&alice(), &bob()), granted);
                    prop_assert_eq!(token.balance_of(&carol()), 0);
                }
            }
        }
    }
}
