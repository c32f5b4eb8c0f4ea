//! Registry Logic for Arena Registry
//!
//! Deterministic core of the tournament registration platform. This crate is
//! compiled to:
//! - Native (for the on-chain program and the gateway operator)
//! - WASM (for frontend eligibility preflight)

mod gateway;
mod ledger;
mod rules;

#[cfg(feature = "wasm")]
mod wasm;

pub use gateway::{
    decode_signature_hex, encode_signature_hex, order_ref_hash, parse_webhook, sign_order,
    verify_order, GatewayError, WebhookPayload, WebhookStatus, SIGNATURE_LEN,
};
pub use ledger::{CreditOutcome, Entry, EntryKind, EntryStatus, LedgerBook, LedgerError};
pub use rules::{
    evaluate, Decision, DenyReason, EligibilityInput, GameType, TeamSnapshot, TournamentSnapshot,
    UserSnapshot,
};
