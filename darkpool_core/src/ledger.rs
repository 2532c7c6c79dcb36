use crate::error::EngineError;
use crate::order::{AccountId, Asset};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// A single user's reserve of one asset: funds that may be freely used
/// (`available`) and funds committed to a resident order or in-flight trade
/// (`liability`). Both are always non-negative (invariant P1/B1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserBalance {
    pub available: Decimal,
    pub liability: Decimal,
}

impl UserBalance {
    pub fn total(&self) -> Decimal {
        self.available + self.liability
    }
}

#[derive(Debug, Clone, Default)]
struct User {
    balance_a: UserBalance,
    balance_b: UserBalance,
}

impl User {
    fn balance(&self, asset: Asset) -> &UserBalance {
        match asset {
            Asset::A => &self.balance_a,
            Asset::B => &self.balance_b,
        }
    }

    fn balance_mut(&mut self, asset: Asset) -> &mut UserBalance {
        match asset {
            Asset::A => &mut self.balance_a,
            Asset::B => &mut self.balance_b,
        }
    }
}

/// Per-user two-asset balance bookkeeping with an available/liability split.
///
/// `Ledger` is the sole owner of every `UserBalance` value (§3 ownership
/// rule) and every mutating call here either fully succeeds or leaves the
/// ledger byte-for-byte unchanged — there is no partial-application failure
/// mode to reason about at call sites.
#[derive(Debug, Default)]
pub struct Ledger {
    users: HashMap<AccountId, User>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    fn user_or_default(&self, account: &str) -> User {
        self.users.get(account).cloned().unwrap_or_default()
    }

    pub fn exists(&self, account: &str) -> bool {
        self.users.contains_key(account)
    }

    pub fn available(&self, account: &str, asset: Asset) -> Decimal {
        self.users.get(account).map_or(Decimal::ZERO, |u| u.balance(asset).available)
    }

    pub fn liability(&self, account: &str, asset: Asset) -> Decimal {
        self.users.get(account).map_or(Decimal::ZERO, |u| u.balance(asset).liability)
    }

    pub fn total(&self, account: &str, asset: Asset) -> Decimal {
        self.available(account, asset) + self.liability(account, asset)
    }

    /// Creates the user if absent; adds `amt` to `available`. Requires `amt > 0`.
    pub fn deposit(&mut self, account: &str, asset: Asset, amt: Decimal) -> Result<(), EngineError> {
        if amt <= Decimal::ZERO {
            return Err(EngineError::Validation("deposit amount must be positive".into()));
        }
        let user = self.users.entry(account.to_string()).or_default();
        user.balance_mut(asset).available += amt;
        Ok(())
    }

    pub fn can_allocate(&self, account: &str, asset: Asset, amt: Decimal) -> bool {
        self.available(account, asset) >= amt
    }

    /// Moves `amt` from `available` to `liability`. Fails (unchanged) if `available < amt`.
    pub fn allocate(&mut self, account: &str, asset: Asset, amt: Decimal) -> Result<(), EngineError> {
        if !self.can_allocate(account, asset, amt) {
            return Err(EngineError::InsufficientFunds {
                available: self.available(account, asset),
                required: amt,
            });
        }
        let user = self.users.get_mut(account).expect("can_allocate implies user exists");
        let balance = user.balance_mut(asset);
        balance.available -= amt;
        balance.liability += amt;
        Ok(())
    }

    /// Inverse of `allocate`. Fails (unchanged) if `liability < amt`.
    pub fn release(&mut self, account: &str, asset: Asset, amt: Decimal) -> Result<(), EngineError> {
        let liability = self.liability(account, asset);
        if liability < amt {
            return Err(EngineError::Internal(format!(
                "release of {amt} exceeds liability {liability} for {account}/{asset}"
            )));
        }
        let user = self.users.get_mut(account).expect("liability check implies user exists");
        let balance = user.balance_mut(asset);
        balance.liability -= amt;
        balance.available += amt;
        Ok(())
    }

    /// Decrements `liability` without returning funds to `available` — used
    /// once liability has actually been paid out via trade settlement.
    pub fn consume_liability(&mut self, account: &str, asset: Asset, amt: Decimal) -> Result<(), EngineError> {
        let liability = self.liability(account, asset);
        if liability < amt {
            return Err(EngineError::Internal(format!(
                "consume_liability of {amt} exceeds liability {liability} for {account}/{asset}"
            )));
        }
        let user = self.users.get_mut(account).expect("liability check implies user exists");
        user.balance_mut(asset).liability -= amt;
        Ok(())
    }

    /// Adds to `available` (trade proceeds); creates the user if absent.
    pub fn credit(&mut self, account: &str, asset: Asset, amt: Decimal) {
        let user = self.users.entry(account.to_string()).or_default();
        user.balance_mut(asset).available += amt;
    }

    pub fn can_withdraw(&self, account: &str, asset: Asset, amt: Decimal) -> bool {
        self.available(account, asset) >= amt
    }

    pub fn withdraw(&mut self, account: &str, asset: Asset, amt: Decimal) -> Result<(), EngineError> {
        if !self.can_withdraw(account, asset, amt) {
            return Err(EngineError::InsufficientFunds {
                available: self.available(account, asset),
                required: amt,
            });
        }
        let user = self.users.get_mut(account).expect("can_withdraw implies user exists");
        user.balance_mut(asset).available -= amt;
        Ok(())
    }

    /// Snapshot used by tests/invariant checks; not part of the hot path.
    pub fn snapshot(&self, account: &str) -> (UserBalance, UserBalance) {
        let user = self.user_or_default(account);
        (user.balance_a, user.balance_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn deposit_creates_user_lazily() {
        let mut ledger = Ledger::new();
        assert!(!ledger.exists("alice"));
        ledger.deposit("alice", Asset::A, dec!(100)).unwrap();
        assert!(ledger.exists("alice"));
        assert_eq!(ledger.available("alice", Asset::A), dec!(100));
    }

    #[test]
    fn deposit_rejects_non_positive() {
        let mut ledger = Ledger::new();
        assert!(ledger.deposit("alice", Asset::A, dec!(0)).is_err());
        assert!(ledger.deposit("alice", Asset::A, dec!(-1)).is_err());
    }

    #[test]
    fn allocate_and_release_round_trip_leaves_ledger_unchanged() {
        let mut ledger = Ledger::new();
        ledger.deposit("alice", Asset::A, dec!(100)).unwrap();
        ledger.allocate("alice", Asset::A, dec!(40)).unwrap();
        assert_eq!(ledger.available("alice", Asset::A), dec!(60));
        assert_eq!(ledger.liability("alice", Asset::A), dec!(40));

        ledger.release("alice", Asset::A, dec!(40)).unwrap();
        assert_eq!(ledger.available("alice", Asset::A), dec!(100));
        assert_eq!(ledger.liability("alice", Asset::A), dec!(0));
    }

    #[test]
    fn allocate_over_available_fails_and_is_noop() {
        let mut ledger = Ledger::new();
        ledger.deposit("alice", Asset::A, dec!(10)).unwrap();
        assert!(ledger.allocate("alice", Asset::A, dec!(20)).is_err());
        assert_eq!(ledger.available("alice", Asset::A), dec!(10));
        assert_eq!(ledger.liability("alice", Asset::A), dec!(0));
    }

    #[test]
    fn consume_liability_does_not_return_to_available() {
        let mut ledger = Ledger::new();
        ledger.deposit("alice", Asset::A, dec!(100)).unwrap();
        ledger.allocate("alice", Asset::A, dec!(50)).unwrap();
        ledger.consume_liability("alice", Asset::A, dec!(50)).unwrap();
        assert_eq!(ledger.available("alice", Asset::A), dec!(50));
        assert_eq!(ledger.liability("alice", Asset::A), dec!(0));
    }

    #[test]
    fn deposit_then_withdraw_round_trip() {
        let mut ledger = Ledger::new();
        ledger.deposit("alice", Asset::A, dec!(30)).unwrap();
        ledger.withdraw("alice", Asset::A, dec!(30)).unwrap();
        assert_eq!(ledger.available("alice", Asset::A), dec!(0));
        assert_eq!(ledger.total("alice", Asset::A), dec!(0));
    }

    #[test]
    fn withdraw_blocked_by_liability() {
        let mut ledger = Ledger::new();
        ledger.deposit("alice", Asset::A, dec!(100)).unwrap();
        ledger.allocate("alice", Asset::A, dec!(50)).unwrap();
        assert!(!ledger.can_withdraw("alice", Asset::A, dec!(100)));
        assert!(ledger.can_withdraw("alice", Asset::A, dec!(50)));
    }

    #[test]
    fn credit_creates_user_if_absent() {
        let mut ledger = Ledger::new();
        ledger.credit("bob", Asset::B, dec!(5));
        assert_eq!(ledger.available("bob", Asset::B), dec!(5));
    }
}
