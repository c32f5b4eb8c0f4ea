//! Payment gateway order verification
//!
//! The gateway confirms payments through signed callbacks: a keyed hash over
//! `order_id|payment_id` for client-supplied proofs, and a broker-level keyed
//! hash over the raw webhook body. Verification runs off-chain in the
//! operator, which then submits `complete_credit`/`fail_credit`; crediting
//! idempotency lives there, so processing the same webhook twice is safe.
//!
//! A client-supplied "verified" flag is never trusted — only the keyed hash.

use serde::{Deserialize, Serialize};
use solana_sha256_hasher::hash;

/// HMAC-SHA256 output length
pub const SIGNATURE_LEN: usize = 32;

/// SHA-256 block length, for HMAC key padding
const BLOCK_LEN: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewayError {
    /// Keyed-hash mismatch: tampering or misconfiguration. Terminal; never
    /// credit on this path.
    SignatureMismatch,
    /// Signature header is not 32 hex-encoded bytes
    MalformedSignature,
    /// Webhook body did not parse as a gateway payload
    MalformedPayload(String),
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::SignatureMismatch => write!(f, "gateway signature mismatch"),
            GatewayError::MalformedSignature => write!(f, "malformed signature header"),
            GatewayError::MalformedPayload(e) => write!(f, "malformed webhook payload: {}", e),
        }
    }
}

impl std::error::Error for GatewayError {}

/// HMAC-SHA256 (RFC 2104) over the sha256 primitive.
fn hmac_sha256(secret: &[u8], message: &[u8]) -> [u8; SIGNATURE_LEN] {
    let mut key = [0u8; BLOCK_LEN];
    if secret.len() > BLOCK_LEN {
        key[..SIGNATURE_LEN].copy_from_slice(&hash(secret).to_bytes());
    } else {
        key[..secret.len()].copy_from_slice(secret);
    }

    let mut inner = Vec::with_capacity(BLOCK_LEN + message.len());
    inner.extend(key.iter().map(|b| b ^ 0x36));
    inner.extend_from_slice(message);
    let inner_hash = hash(&inner);

    let mut outer = Vec::with_capacity(BLOCK_LEN + SIGNATURE_LEN);
    outer.extend(key.iter().map(|b| b ^ 0x5c));
    outer.extend_from_slice(&inner_hash.to_bytes());
    hash(&outer).to_bytes()
}

/// Constant-time byte comparison: accumulates the XOR of every byte pair so
/// timing does not reveal the first differing position.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Signature the gateway attaches to a completed order: keyed hash over
/// `order_id|payment_id`.
pub fn sign_order(secret: &[u8], order_id: &str, payment_id: &str) -> [u8; SIGNATURE_LEN] {
    let mut message = Vec::with_capacity(order_id.len() + 1 + payment_id.len());
    message.extend_from_slice(order_id.as_bytes());
    message.push(b'|');
    message.extend_from_slice(payment_id.as_bytes());
    hmac_sha256(secret, &message)
}

/// Verify a client-supplied payment proof against the server-held secret.
pub fn verify_order(
    secret: &[u8],
    order_id: &str,
    payment_id: &str,
    signature: &[u8],
) -> Result<(), GatewayError> {
    let expected = sign_order(secret, order_id, payment_id);
    if constant_time_eq(&expected, signature) {
        Ok(())
    } else {
        Err(GatewayError::SignatureMismatch)
    }
}

/// Digest of an external order id, used as the credit ledger-entry PDA seed
/// by both the program and the operator.
pub fn order_ref_hash(external_ref: &str) -> [u8; 32] {
    hash(external_ref.as_bytes()).to_bytes()
}

/// Decode a hex signature header into raw bytes.
pub fn decode_signature_hex(header: &str) -> Result<[u8; SIGNATURE_LEN], GatewayError> {
    let bytes = header.as_bytes();
    if bytes.len() != SIGNATURE_LEN * 2 {
        return Err(GatewayError::MalformedSignature);
    }
    let nibble = |c: u8| -> Result<u8, GatewayError> {
        match c {
            b'0'..=b'9' => Ok(c - b'0'),
            b'a'..=b'f' => Ok(c - b'a' + 10),
            b'A'..=b'F' => Ok(c - b'A' + 10),
            _ => Err(GatewayError::MalformedSignature),
        }
    };
    let mut out = [0u8; SIGNATURE_LEN];
    for (i, pair) in bytes.chunks(2).enumerate() {
        out[i] = (nibble(pair[0])? << 4) | nibble(pair[1])?;
    }
    Ok(out)
}

/// Payment status embedded in a webhook payload
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookStatus {
    Captured,
    Failed,
}

/// Gateway webhook payload, trusted only after the raw-body hash checks out
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub order_id: String,
    pub payment_id: String,
    pub status: WebhookStatus,
    /// Minor units
    pub amount: u64,
}

/// Verify and parse a webhook delivery.
///
/// The keyed hash covers the raw body and is checked before any field of the
/// payload is believed, because deliveries can be retried or spoofed. The
/// caller routes `Captured` to `complete_credit` and `Failed` to
/// `fail_credit`; both are idempotent, so duplicate deliveries are harmless.
pub fn parse_webhook(
    secret: &[u8],
    raw_body: &[u8],
    signature_header: &str,
) -> Result<WebhookPayload, GatewayError> {
    let signature = decode_signature_hex(signature_header)?;
    let expected = hmac_sha256(secret, raw_body);
    if !constant_time_eq(&expected, &signature) {
        return Err(GatewayError::SignatureMismatch);
    }
    serde_json::from_slice(raw_body).map_err(|e| GatewayError::MalformedPayload(e.to_string()))
}

/// Hex-encode a signature, the wire form of the webhook header.
pub fn encode_signature_hex(signature: &[u8; SIGNATURE_LEN]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(SIGNATURE_LEN * 2);
    for &byte in signature {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"server-held-webhook-secret";

    #[test]
    fn test_sign_verify_round_trip() {
        let sig = sign_order(SECRET, "order_abc", "pay_123");
        assert!(verify_order(SECRET, "order_abc", "pay_123", &sig).is_ok());
    }

    #[test]
    fn test_signature_is_deterministic() {
        assert_eq!(
            sign_order(SECRET, "order_abc", "pay_123"),
            sign_order(SECRET, "order_abc", "pay_123")
        );
    }

    #[test]
    fn test_flipped_byte_rejected() {
        let mut sig = sign_order(SECRET, "order_abc", "pay_123");
        sig[7] ^= 0x01;
        assert_eq!(
            verify_order(SECRET, "order_abc", "pay_123", &sig),
            Err(GatewayError::SignatureMismatch)
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let sig = sign_order(b"other-secret", "order_abc", "pay_123");
        assert_eq!(
            verify_order(SECRET, "order_abc", "pay_123", &sig),
            Err(GatewayError::SignatureMismatch)
        );
    }

    #[test]
    fn test_swapped_ids_rejected() {
        // The separator binds the two ids; swapping them must not verify.
        let sig = sign_order(SECRET, "order_abc", "pay_123");
        assert_eq!(
            verify_order(SECRET, "pay_123", "order_abc", &sig),
            Err(GatewayError::SignatureMismatch)
        );
    }

    #[test]
    fn test_truncated_signature_rejected() {
        let sig = sign_order(SECRET, "order_abc", "pay_123");
        assert_eq!(
            verify_order(SECRET, "order_abc", "pay_123", &sig[..16]),
            Err(GatewayError::SignatureMismatch)
        );
    }

    #[test]
    fn test_long_secret_is_hashed_down() {
        let long_secret = [0xabu8; 100];
        let sig = sign_order(&long_secret, "o", "p");
        assert!(verify_order(&long_secret, "o", "p", &sig).is_ok());
    }

    #[test]
    fn test_order_ref_hash_stable_and_distinct() {
        assert_eq!(order_ref_hash("ord_1"), order_ref_hash("ord_1"));
        assert_ne!(order_ref_hash("ord_1"), order_ref_hash("ord_2"));
    }

    #[test]
    fn test_hex_round_trip() {
        let sig = sign_order(SECRET, "order_abc", "pay_123");
        let header = encode_signature_hex(&sig);
        assert_eq!(decode_signature_hex(&header).unwrap(), sig);
    }

    #[test]
    fn test_hex_decode_rejects_garbage() {
        assert_eq!(decode_signature_hex("zz"), Err(GatewayError::MalformedSignature));
        let bad = "g".repeat(SIGNATURE_LEN * 2);
        assert_eq!(decode_signature_hex(&bad), Err(GatewayError::MalformedSignature));
    }

    fn signed_webhook(body: &str) -> (Vec<u8>, String) {
        let raw = body.as_bytes().to_vec();
        let header = encode_signature_hex(&hmac_sha256(SECRET, &raw));
        (raw, header)
    }

    #[test]
    fn test_webhook_parse_captured() {
        let (raw, header) = signed_webhook(
            r#"{"order_id":"ord_1","payment_id":"pay_9","status":"captured","amount":1000}"#,
        );
        let payload = parse_webhook(SECRET, &raw, &header).unwrap();
        assert_eq!(payload.order_id, "ord_1");
        assert_eq!(payload.status, WebhookStatus::Captured);
        assert_eq!(payload.amount, 1000);
    }

    #[test]
    fn test_webhook_parse_failed_status() {
        let (raw, header) = signed_webhook(
            r#"{"order_id":"ord_2","payment_id":"pay_0","status":"failed","amount":500}"#,
        );
        let payload = parse_webhook(SECRET, &raw, &header).unwrap();
        assert_eq!(payload.status, WebhookStatus::Failed);
    }

    #[test]
    fn test_webhook_body_tamper_rejected_before_parse() {
        let (mut raw, header) = signed_webhook(
            r#"{"order_id":"ord_1","payment_id":"pay_9","status":"captured","amount":1000}"#,
        );
        // Inflate the amount after signing; must fail on the hash, even
        // though the body would parse fine.
        let tampered = String::from_utf8(raw.clone()).unwrap().replace("1000", "9000");
        raw = tampered.into_bytes();
        assert_eq!(
            parse_webhook(SECRET, &raw, &header),
            Err(GatewayError::SignatureMismatch)
        );
    }

    #[test]
    fn test_webhook_embedded_flag_not_trusted() {
        // A body claiming success with no valid hash never verifies.
        let raw = br#"{"order_id":"ord_1","payment_id":"pay_9","status":"captured","amount":1000}"#;
        let forged = encode_signature_hex(&[0u8; SIGNATURE_LEN]);
        assert_eq!(
            parse_webhook(SECRET, raw, &forged),
            Err(GatewayError::SignatureMismatch)
        );
    }

    #[test]
    fn test_webhook_duplicate_delivery_parses_identically() {
        let (raw, header) = signed_webhook(
            r#"{"order_id":"ord_1","payment_id":"pay_9","status":"captured","amount":1000}"#,
        );
        let first = parse_webhook(SECRET, &raw, &header).unwrap();
        let second = parse_webhook(SECRET, &raw, &header).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_webhook_malformed_body_after_valid_hash() {
        let (raw, header) = signed_webhook(r#"{"not":"a payload"}"#);
        assert!(matches!(
            parse_webhook(SECRET, &raw, &header),
            Err(GatewayError::MalformedPayload(_))
        ));
    }
}
