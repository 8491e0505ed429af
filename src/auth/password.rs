//! Password Hashing
//! Mission: One-way salted hashing and verification of login passwords

use anyhow::{Context, Result};

/// Hash a plaintext password with bcrypt at the given cost factor.
///
/// The digest embeds the cost and a random salt, so hashing the same
/// plaintext twice yields different digests that both verify.
pub fn hash_password(plaintext: &str, cost: u32) -> Result<String> {
    bcrypt::hash(plaintext, cost).context("Failed to hash password")
}

/// Compare a candidate password against a stored bcrypt digest.
///
/// A mismatch is `Ok(false)`, not an error. The only error is a
/// structurally invalid digest (storage corruption), which is fatal for
/// this single verification and reported to the caller.
pub fn verify_password(candidate: &str, digest: &str) -> Result<bool> {
    bcrypt::verify(candidate, digest).context("Stored password digest is malformed")
}
