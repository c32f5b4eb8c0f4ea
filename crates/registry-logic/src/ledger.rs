//! Reference wallet-ledger model
//!
//! One `LedgerBook` is one user's wallet: a cached balance plus the
//! append-only entry history that justifies it. The on-chain wallet
//! instructions implement the same rules against accounts; this model is the
//! executable contract they are held to, including the balance invariant
//! (balance == sum of completed entry amounts) and credit idempotency keyed
//! by external reference.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Typed movement of funds into or out of a wallet
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    Deposit,
    Withdrawal,
    EntryFee,
    PrizePayout,
}

impl EntryKind {
    /// Credits move funds into the wallet, debits out.
    pub fn is_credit(self) -> bool {
        matches!(self, EntryKind::Deposit | EntryKind::PrizePayout)
    }
}

/// Lifecycle of one entry. Entries are immutable once `Completed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStatus {
    Pending,
    Completed,
    Failed,
}

/// One ledger entry. `amount` is signed: positive credits, negative debits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: u64,
    pub kind: EntryKind,
    pub amount: i64,
    pub status: EntryStatus,
    /// Gateway order id; the idempotency key for credits
    pub external_ref: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedgerError {
    /// Debit would overdraw the balance
    InsufficientFunds,
    /// Zero or otherwise unusable amount
    InvalidAmount,
    /// A credit with this external reference already exists
    DuplicateRef,
    /// No entry with this external reference was ever created
    NotFound,
    /// Entry is not in `Pending` (e.g. completing a failed credit)
    CreditNotPending,
}

/// Outcome of `complete_credit`, both variants carrying the entry id
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreditOutcome {
    /// First completion: balance was credited
    Applied(u64),
    /// Replay: entry was already completed, balance untouched
    AlreadyCompleted(u64),
}

/// Append-only ledger for a single wallet account
#[derive(Clone, Debug, Default)]
pub struct LedgerBook {
    balance: u64,
    entries: Vec<Entry>,
    by_ref: HashMap<String, usize>,
}

impl LedgerBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Book seeded with an opening balance, recorded as a completed deposit
    /// so the balance invariant holds from the start.
    pub fn with_balance(opening: u64) -> Self {
        let mut book = Self::new();
        if opening > 0 {
            book.push_entry(EntryKind::Deposit, opening as i64, EntryStatus::Completed, None);
            book.balance = opening;
        }
        book
    }

    /// Current spendable balance. Never blocks, never consults the gateway.
    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry_by_ref(&self, external_ref: &str) -> Option<&Entry> {
        self.by_ref.get(external_ref).map(|&i| &self.entries[i])
    }

    /// Signed sum of completed entries; the balance invariant is
    /// `balance == completed_sum` at all times.
    pub fn completed_sum(&self) -> i64 {
        self.entries
            .iter()
            .filter(|e| e.status == EntryStatus::Completed)
            .map(|e| e.amount)
            .sum()
    }

    pub fn invariant_holds(&self) -> bool {
        self.completed_sum() == self.balance as i64
    }

    fn push_entry(
        &mut self,
        kind: EntryKind,
        amount: i64,
        status: EntryStatus,
        external_ref: Option<String>,
    ) -> u64 {
        let id = self.entries.len() as u64;
        if let Some(ref key) = external_ref {
            self.by_ref.insert(key.clone(), self.entries.len());
        }
        self.entries.push(Entry { id, kind, amount, status, external_ref });
        id
    }

    /// Atomically check `balance >= amount`, append a completed debit entry
    /// and decrement the balance. The check runs against the current
    /// committed balance, so a sequence of debits can never overdraw
    /// regardless of how callers interleave.
    pub fn reserve_and_debit(&mut self, kind: EntryKind, amount: u64) -> Result<u64, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if kind.is_credit() {
            return Err(LedgerError::InvalidAmount);
        }
        if self.balance < amount {
            return Err(LedgerError::InsufficientFunds);
        }
        self.balance -= amount;
        Ok(self.push_entry(kind, -(amount as i64), EntryStatus::Completed, None))
    }

    /// Record a credit the gateway has not yet confirmed. No balance effect.
    pub fn create_pending_credit(
        &mut self,
        kind: EntryKind,
        amount: u64,
        external_ref: &str,
    ) -> Result<u64, LedgerError> {
        // Entry amounts are signed; a credit above i64::MAX would wrap
        // negative when stored.
        if amount == 0 || amount > i64::MAX as u64 {
            return Err(LedgerError::InvalidAmount);
        }
        if !kind.is_credit() {
            return Err(LedgerError::InvalidAmount);
        }
        if self.by_ref.contains_key(external_ref) {
            return Err(LedgerError::DuplicateRef);
        }
        Ok(self.push_entry(
            kind,
            amount as i64,
            EntryStatus::Pending,
            Some(external_ref.to_string()),
        ))
    }

    /// Complete a pending credit, crediting the balance exactly once per
    /// external reference. Replays return `AlreadyCompleted` with the
    /// original entry id and leave the balance unchanged.
    pub fn complete_credit(&mut self, external_ref: &str) -> Result<CreditOutcome, LedgerError> {
        let index = *self.by_ref.get(external_ref).ok_or(LedgerError::NotFound)?;
        match self.entries[index].status {
            EntryStatus::Completed => Ok(CreditOutcome::AlreadyCompleted(self.entries[index].id)),
            EntryStatus::Failed => Err(LedgerError::CreditNotPending),
            EntryStatus::Pending => {
                self.entries[index].status = EntryStatus::Completed;
                self.balance += self.entries[index].amount as u64;
                Ok(CreditOutcome::Applied(self.entries[index].id))
            }
        }
    }

    /// Mark a pending credit failed. No balance effect; idempotent on an
    /// already-failed entry.
    pub fn fail_credit(&mut self, external_ref: &str) -> Result<(), LedgerError> {
        let index = *self.by_ref.get(external_ref).ok_or(LedgerError::NotFound)?;
        match self.entries[index].status {
            EntryStatus::Completed => Err(LedgerError::CreditNotPending),
            EntryStatus::Failed => Ok(()),
            EntryStatus::Pending => {
                self.entries[index].status = EntryStatus::Failed;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_book_is_empty() {
        let book = LedgerBook::new();
        assert_eq!(book.balance(), 0);
        assert!(book.entries().is_empty());
        assert!(book.invariant_holds());
    }

    #[test]
    fn test_opening_balance_is_backed_by_entry() {
        let book = LedgerBook::with_balance(500);
        assert_eq!(book.balance(), 500);
        assert_eq!(book.entries().len(), 1);
        assert_eq!(book.entries()[0].kind, EntryKind::Deposit);
        assert!(book.invariant_holds());
    }

    #[test]
    fn test_debit_decrements_and_appends() {
        let mut book = LedgerBook::with_balance(500);
        let id = book.reserve_and_debit(EntryKind::EntryFee, 50).unwrap();
        assert_eq!(book.balance(), 450);
        let entry = &book.entries()[id as usize];
        assert_eq!(entry.amount, -50);
        assert_eq!(entry.status, EntryStatus::Completed);
        assert!(book.invariant_holds());
    }

    #[test]
    fn test_debit_rejects_overdraft() {
        let mut book = LedgerBook::with_balance(40);
        assert_eq!(
            book.reserve_and_debit(EntryKind::EntryFee, 50),
            Err(LedgerError::InsufficientFunds)
        );
        assert_eq!(book.balance(), 40);
        assert_eq!(book.entries().len(), 1);
    }

    #[test]
    fn test_debit_rejects_zero_and_credit_kinds() {
        let mut book = LedgerBook::with_balance(100);
        assert_eq!(
            book.reserve_and_debit(EntryKind::EntryFee, 0),
            Err(LedgerError::InvalidAmount)
        );
        assert_eq!(
            book.reserve_and_debit(EntryKind::Deposit, 10),
            Err(LedgerError::InvalidAmount)
        );
    }

    #[test]
    fn test_credit_above_i64_max_rejected() {
        let mut book = LedgerBook::new();
        assert_eq!(
            book.create_pending_credit(EntryKind::Deposit, i64::MAX as u64 + 1, "ord_big"),
            Err(LedgerError::InvalidAmount)
        );
        let id = book
            .create_pending_credit(EntryKind::Deposit, i64::MAX as u64, "ord_max")
            .unwrap();
        assert!(book.entries()[id as usize].amount > 0);
    }

    #[test]
    fn test_pending_credit_does_not_touch_balance() {
        let mut book = LedgerBook::new();
        book.create_pending_credit(EntryKind::Deposit, 1000, "ord_1").unwrap();
        assert_eq!(book.balance(), 0);
        assert!(book.invariant_holds());
    }

    #[test]
    fn test_duplicate_ref_rejected() {
        let mut book = LedgerBook::new();
        book.create_pending_credit(EntryKind::Deposit, 1000, "ord_1").unwrap();
        assert_eq!(
            book.create_pending_credit(EntryKind::Deposit, 500, "ord_1"),
            Err(LedgerError::DuplicateRef)
        );
    }

    #[test]
    fn test_webhook_replay_credits_once() {
        // CreatePendingCredit(u, 1000, "ord_1") then CompleteCredit twice:
        // balance increases by 1000 exactly once.
        let mut book = LedgerBook::new();
        let id = book.create_pending_credit(EntryKind::Deposit, 1000, "ord_1").unwrap();

        assert_eq!(book.complete_credit("ord_1"), Ok(CreditOutcome::Applied(id)));
        assert_eq!(book.balance(), 1000);

        assert_eq!(
            book.complete_credit("ord_1"),
            Ok(CreditOutcome::AlreadyCompleted(id))
        );
        assert_eq!(book.balance(), 1000);
        assert!(book.invariant_holds());
    }

    #[test]
    fn test_complete_unknown_ref_is_not_found() {
        let mut book = LedgerBook::new();
        assert_eq!(book.complete_credit("ord_missing"), Err(LedgerError::NotFound));
        assert_eq!(book.fail_credit("ord_missing"), Err(LedgerError::NotFound));
    }

    #[test]
    fn test_failed_credit_never_credits() {
        let mut book = LedgerBook::new();
        book.create_pending_credit(EntryKind::Deposit, 1000, "ord_1").unwrap();
        book.fail_credit("ord_1").unwrap();
        assert_eq!(book.balance(), 0);

        // Failing again is a no-op; completing afterwards is a contract
        // violation, not a silent credit.
        assert_eq!(book.fail_credit("ord_1"), Ok(()));
        assert_eq!(book.complete_credit("ord_1"), Err(LedgerError::CreditNotPending));
        assert_eq!(book.balance(), 0);
        assert!(book.invariant_holds());
    }

    #[test]
    fn test_fail_after_complete_rejected() {
        let mut book = LedgerBook::new();
        book.create_pending_credit(EntryKind::Deposit, 1000, "ord_1").unwrap();
        book.complete_credit("ord_1").unwrap();
        assert_eq!(book.fail_credit("ord_1"), Err(LedgerError::CreditNotPending));
        assert_eq!(book.balance(), 1000);
    }

    #[test]
    fn test_prize_payout_via_credit_path() {
        let mut book = LedgerBook::new();
        book.create_pending_credit(EntryKind::PrizePayout, 2500, "payout_t1_w1").unwrap();
        book.complete_credit("payout_t1_w1").unwrap();
        assert_eq!(book.balance(), 2500);
        assert_eq!(book.entry_by_ref("payout_t1_w1").unwrap().kind, EntryKind::PrizePayout);
    }

    #[test]
    fn test_entry_lookup_by_ref() {
        let mut book = LedgerBook::new();
        book.create_pending_credit(EntryKind::Deposit, 300, "ord_9").unwrap();
        let entry = book.entry_by_ref("ord_9").unwrap();
        assert_eq!(entry.amount, 300);
        assert_eq!(entry.status, EntryStatus::Pending);
        assert!(book.entry_by_ref("ord_8").is_none());
    }

    /// Serialized debits drawn from one balance: exactly floor(B/A) of K
    /// same-sized debits can succeed, however they interleave with callers.
    #[test]
    fn test_concurrent_debits_never_overdraw() {
        let balance = 100u64;
        let amount = 30u64;
        let mut book = LedgerBook::with_balance(balance);

        let successes = (0..8)
            .filter(|_| book.reserve_and_debit(EntryKind::EntryFee, amount).is_ok())
            .count();

        assert_eq!(successes as u64, balance / amount);
        assert_eq!(book.balance(), balance % amount);
        assert!(book.invariant_holds());
    }

    proptest! {
        /// No-overdraft property: K debits of amount A against balance B,
        /// exactly min(K, floor(B/A)) succeed and the balance never goes
        /// negative (it is unsigned; the invariant check covers the sum).
        #[test]
        fn prop_exact_debit_count(
            balance in 0u64..10_000,
            amount in 1u64..500,
            attempts in 1usize..64,
        ) {
            let mut book = LedgerBook::with_balance(balance);
            let mut successes = 0u64;
            for _ in 0..attempts {
                if book.reserve_and_debit(EntryKind::EntryFee, amount).is_ok() {
                    successes += 1;
                }
            }
            prop_assert_eq!(successes, (attempts as u64).min(balance / amount));
            prop_assert_eq!(book.balance(), balance - successes * amount);
            prop_assert!(book.invariant_holds());
        }

        /// Balance invariant under arbitrary operation sequences: after any
        /// mix of debits, pending credits, completions (including replays)
        /// and failures, balance == sum of completed amounts.
        #[test]
        fn prop_balance_matches_completed_sum(
            opening in 0u64..5_000,
            ops in proptest::collection::vec((0u8..5, 1u64..1_000, 0usize..8), 0..40),
        ) {
            let mut book = LedgerBook::with_balance(opening);
            for (op, amount, ref_index) in ops {
                let external_ref = format!("ord_{}", ref_index);
                match op {
                    0 => { let _ = book.reserve_and_debit(EntryKind::EntryFee, amount); }
                    1 => { let _ = book.reserve_and_debit(EntryKind::Withdrawal, amount); }
                    2 => { let _ = book.create_pending_credit(EntryKind::Deposit, amount, &external_ref); }
                    3 => { let _ = book.complete_credit(&external_ref); }
                    _ => { let _ = book.fail_credit(&external_ref); }
                }
                prop_assert!(book.invariant_holds());
            }
        }

        /// Replaying complete_credit any number of times credits once.
        #[test]
        fn prop_replay_credits_once(amount in 1u64..10_000, replays in 1usize..16) {
            let mut book = LedgerBook::new();
            book.create_pending_credit(EntryKind::Deposit, amount, "ord_r").unwrap();
            for _ in 0..replays {
                book.complete_credit("ord_r").unwrap();
            }
            prop_assert_eq!(book.balance(), amount);
            prop_assert!(book.invariant_holds());
        }
    }
}
