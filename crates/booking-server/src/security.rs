// crates/booking-server/src/security.rs
// ============================================================================
// Module: Server Security Helpers
// Description: Constant-time comparison and token fingerprint utilities.
// Purpose: Keep secret handling out of request and audit code paths.
// Dependencies: sha2, subtle
// ============================================================================

//! ## Overview
//! Bearer tokens are compared in constant time and only ever leave the
//! resolver as a sha256 fingerprint.

use sha2::Digest;
use sha2::Sha256;
use subtle::ConstantTimeEq;

// ============================================================================
// SECTION: Constant-Time Comparisons
// ============================================================================

/// Compares two byte slices in constant time.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// Compares two strings in constant time.
#[must_use]
pub fn constant_time_eq_str(a: &str, b: &str) -> bool {
    constant_time_eq(a.as_bytes(), b.as_bytes())
}

// ============================================================================
// SECTION: Fingerprints
// ============================================================================

/// Returns the lowercase hex sha256 digest of `token`.
#[must_use]
pub fn token_fingerprint(token: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let digest = Sha256::digest(token.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest.iter().copied() {
        out.push(char::from(HEX[usize::from(byte >> 4)]));
        out.push(char::from(HEX[usize::from(byte & 0x0f)]));
    }
    out
}
