//! Domain change events
//!
//! Emitted at commit points so consumers (UI refresh, notifications, the
//! gateway operator) can subscribe without the core knowing the transport.

use anchor_lang::prelude::*;

use crate::state::{BanSubject, LedgerKind};

#[event]
pub struct RegistrationCreated {
    pub tournament: Pubkey,
    pub team: Pubkey,
    pub user: Pubkey,
    /// Entry fee debited, minor units
    pub fee_paid: u64,
    pub slot: u64,
}

#[event]
pub struct BalanceChanged {
    pub user: Pubkey,
    pub wallet: Pubkey,
    /// Ledger entry that moved the balance
    pub entry: Pubkey,
    pub kind: LedgerKind,
    /// Signed minor units: positive credit, negative debit
    pub amount: i64,
    pub balance_after: u64,
    pub slot: u64,
}

#[event]
pub struct BanPlaced {
    pub organization_hash: [u8; 32],
    pub subject: Pubkey,
    pub kind: BanSubject,
    pub slot: u64,
}

#[event]
pub struct BanLifted {
    pub organization_hash: [u8; 32],
    pub subject: Pubkey,
    pub slot: u64,
}
