//! WASM bindings for frontend eligibility preflight
//!
//! The UI calls `evaluate` with the same snapshot the chain sees to
//! enable/disable the Join button and render the deny reason. Decisions here
//! are advisory; the program re-runs the same checks at registration.

#![cfg(feature = "wasm")]

use wasm_bindgen::prelude::*;

use crate::{evaluate, order_ref_hash, Decision, DenyReason, EligibilityInput, GameType};

/// Evaluate a registration attempt.
///
/// # Arguments
/// * `input_json` - JSON serialized `EligibilityInput` snapshot
///
/// # Returns
/// JSON serialized `Decision` (`"Allow"` or `{"Deny": <reason>}`)
#[wasm_bindgen]
pub fn evaluate_registration(input_json: &str) -> Result<JsValue, JsError> {
    let input: EligibilityInput = serde_json::from_str(input_json)
        .map_err(|e| JsError::new(&format!("Invalid eligibility input: {}", e)))?;

    let decision: Decision = evaluate(&input);

    serde_wasm_bindgen::to_value(&decision)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Human-readable message for a deny reason, as the UI should display it
#[wasm_bindgen]
pub fn deny_reason_message(reason_json: &str) -> Result<String, JsError> {
    let reason: DenyReason = serde_json::from_str(reason_json)
        .map_err(|e| JsError::new(&format!("Invalid deny reason: {}", e)))?;

    Ok(reason.message().to_string())
}

#[derive(serde::Serialize)]
struct DenyReasonInfo {
    id: String,
    message: String,
}

/// All deny reasons the evaluator can return, with display messages
#[wasm_bindgen]
pub fn get_deny_reasons() -> Result<JsValue, JsError> {
    let reasons = [
        DenyReason::AccountFrozen,
        DenyReason::VerificationRequired,
        DenyReason::TeamRequired,
        DenyReason::OrganizationBanned,
        DenyReason::AlreadyRegistered,
        DenyReason::RegistrationClosed,
        DenyReason::TournamentFull,
        DenyReason::InsufficientTeamMembers,
        DenyReason::InsufficientBalance,
    ];
    let infos: Vec<DenyReasonInfo> = reasons
        .iter()
        .map(|r| DenyReasonInfo {
            id: format!("{:?}", r),
            message: r.message().to_string(),
        })
        .collect();

    serde_wasm_bindgen::to_value(&infos)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Minimum roster size for a game mode ("Solo", "Duo", "Squad")
#[wasm_bindgen]
pub fn get_roster_minimum(game_type: &str) -> Result<u8, JsError> {
    let game_type = match game_type {
        "Solo" => GameType::Solo,
        "Duo" => GameType::Duo,
        "Squad" => GameType::Squad,
        _ => return Err(JsError::new(&format!("Unknown game type: {}", game_type))),
    };

    Ok(game_type.min_roster())
}

/// Digest of a gateway order id, matching the credit ledger-entry seed used
/// on-chain. Lets the frontend derive the entry address for status display.
#[wasm_bindgen]
pub fn get_order_ref_hash(order_id: &str) -> Vec<u8> {
    order_ref_hash(order_id).to_vec()
}
