//! Property-based tests for token encoding and verification
//!
//! These tests verify:
//! - Tokens roundtrip for any time inside their lifetime
//! - Any bit flip in the signature is detected
//! - Tokens fail as expired from the expiry instant onwards
//! - Tokens are pinned to their issuer
//! - Garbage input never panics

use bastion_auth_core::{AuthError, SigningKey, TokenCodec};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_subject() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_.@-]{1,40}"
}

fn arb_issuer() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9 -]{0,30}"
}

/// Valid signing secrets (32+ bytes)
fn arb_secret() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 32..64)
}

/// Issue time with nanosecond precision, well inside chrono's range
fn arb_issue_time() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_000_000_000i64, 0u32..1_000_000_000u32)
        .prop_map(|(secs, nanos)| DateTime::from_timestamp(secs, nanos).unwrap())
}

fn arb_ttl_secs() -> impl Strategy<Value = i64> {
    1i64..(30 * 24 * 3600)
}

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

fn codec(secret: &[u8]) -> TokenCodec {
    TokenCodec::new(SigningKey::new(secret).unwrap())
}

/// Flip one bit of the decoded signature and re-encode it
fn tamper_signature(token: &str, byte: usize, bit: u8) -> String {
    let (message, signature) = token.rsplit_once('.').unwrap();
    let mut sig = URL_SAFE_NO_PAD.decode(signature).unwrap();
    let idx = byte % sig.len();
    sig[idx] ^= 1 << bit;
    format!("{message}.{}", URL_SAFE_NO_PAD.encode(sig))
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Property: decode(encode(s)) == s for every instant in [t, t + ttl)
    #[test]
    fn prop_roundtrip_within_lifetime(
        subject in arb_subject(),
        issuer in arb_issuer(),
        secret in arb_secret(),
        t in arb_issue_time(),
        ttl in arb_ttl_secs(),
        offset_frac in 0.0f64..1.0f64,
    ) {
        let codec = codec(&secret);
        let issued = codec.encode(&subject, &issuer, Duration::seconds(ttl), t).unwrap();

        let lifetime_ns = ttl * 1_000_000_000;
        let offset_ns = (((lifetime_ns as f64) * offset_frac) as i64).min(lifetime_ns - 1);
        let decoded = codec.decode(&issued.token, &issuer, t + Duration::nanoseconds(offset_ns)).unwrap();
        prop_assert_eq!(decoded, subject);
        prop_assert!(issued.expires_at > issued.issued_at);
    }

    /// Property: flipping any bit of the signature yields TokenBadSignature
    #[test]
    fn prop_signature_tampering_detected(
        subject in arb_subject(),
        secret in arb_secret(),
        t in arb_issue_time(),
        byte in 0usize..32usize,
        bit in 0u8..8u8,
    ) {
        let codec = codec(&secret);
        let issued = codec.encode(&subject, "bastion", Duration::hours(1), t).unwrap();
        let tampered = tamper_signature(&issued.token, byte, bit);

        let result = codec.decode(&tampered, "bastion", t);
        prop_assert!(
            matches!(result, Err(AuthError::TokenBadSignature)),
            "expected bad signature, got {:?}", result
        );
    }

    /// Property: any t' >= t + ttl is expired
    #[test]
    fn prop_expired_after_lifetime(
        subject in arb_subject(),
        secret in arb_secret(),
        t in arb_issue_time(),
        ttl in arb_ttl_secs(),
        late_by_ns in 0i64..1_000_000_000_000i64,
    ) {
        let codec = codec(&secret);
        let issued = codec.encode(&subject, "bastion", Duration::seconds(ttl), t).unwrap();

        let later = t + Duration::seconds(ttl) + Duration::nanoseconds(late_by_ns);
        let result = codec.decode(&issued.token, "bastion", later);
        prop_assert!(matches!(result, Err(AuthError::TokenExpired)), "got {:?}", result);
    }

    /// Property: a token is rejected under any other issuer
    #[test]
    fn prop_issuer_pinned(
        subject in arb_subject(),
        issuer in arb_issuer(),
        other in arb_issuer(),
        secret in arb_secret(),
        t in arb_issue_time(),
    ) {
        prop_assume!(issuer != other);
        let codec = codec(&secret);
        let issued = codec.encode(&subject, &issuer, Duration::hours(1), t).unwrap();

        let result = codec.decode(&issued.token, &other, t);
        prop_assert!(matches!(result, Err(AuthError::TokenIssuerMismatch)), "got {:?}", result);
    }

    /// Property: arbitrary strings never panic and never verify
    #[test]
    fn prop_garbage_never_verifies(garbage in ".{0,200}") {
        let codec = codec(&[7u8; 32]);
        let result = codec.decode(&garbage, "bastion", at(0));
        prop_assert!(
            matches!(result, Err(AuthError::TokenMalformed) | Err(AuthError::TokenBadSignature)),
            "got {:?}", result
        );
    }
}

// ============================================================================
// Fixed cases
// ============================================================================

#[test]
fn test_token_signed_with_other_secret_rejected() {
    let issued = codec(&[1u8; 32])
        .encode("admin", "bastion", Duration::hours(1), at(100))
        .unwrap();
    let result = codec(&[2u8; 32]).decode(&issued.token, "bastion", at(100));
    assert!(matches!(result, Err(AuthError::TokenBadSignature)));
}

#[test]
fn test_unsigned_token_rejected() {
    // alg "none" header with the same claims
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let claims = URL_SAFE_NO_PAD.encode(br#"{"iss":"bastion","sub":"admin","iat":0,"exp":9999999999}"#);
    let token = format!("{header}.{claims}.");

    let result = codec(&[1u8; 32]).decode(&token, "bastion", at(100));
    assert!(matches!(result, Err(AuthError::TokenMalformed)));
}

#[test]
fn test_missing_subject_is_malformed() {
    let key = [3u8; 32];
    let claims = serde_json::json!({ "iss": "bastion", "iat": 0, "exp": 9_999_999_999i64 });
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(&key),
    )
    .unwrap();

    let result = codec(&key).decode(&token, "bastion", at(100));
    assert!(matches!(result, Err(AuthError::TokenMalformed)));
}
