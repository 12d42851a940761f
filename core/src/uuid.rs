//! Request identifiers.
//!
//! Titanic identifies a request by a 32-character uppercase hex string,
//! derived from 16 bytes of OS randomness. We reuse the `uuid` crate's v4
//! generator (itself backed by `getrandom`) rather than hand-rolling a RNG,
//! and format it without hyphens to match the on-disk/wire record size.

use uuid::Uuid;

/// Generate a new request UUID: 32 uppercase hex characters, no hyphens.
///
/// Collision probability is the standard UUIDv4 birthday bound (~2^64
/// requests for a 50% collision chance), which the spec accepts as
/// negligible for expected request volumes.
#[must_use]
pub fn new_uuid() -> String {
    Uuid::new_v4().simple().to_string().to_uppercase()
}

/// A valid Titanic UUID is exactly 32 uppercase hex characters.
#[must_use]
pub fn is_valid(s: &str) -> bool {
    s.len() == 32 && s.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_lowercase())
}
