//! PKCE verifiers, state strings and code challenges.
//!
//! All randomness comes from the thread-local CSPRNG, so every function here is
//! safe to call from any number of threads at once.

use std::ops::RangeInclusive;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use sha2::{Digest, Sha256};
use smol_str::SmolStr;

use crate::error::{Error, Result};
use crate::types::CodeChallengeMethod;

/// Default length of a generated `state` value.
pub const STATE_LENGTH: usize = 20;

/// Default length of a generated code verifier.
pub const CODE_VERIFIER_LENGTH: usize = 128;

/// Allowed code verifier lengths.
// https://datatracker.ietf.org/doc/html/rfc7636#section-4.1
pub const CODE_VERIFIER_LENGTH_RANGE: RangeInclusive<usize> = 43..=128;

const STATE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const CODE_VERIFIER_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

fn random_string(charset: &[u8], length: usize) -> SmolStr {
    let mut rng = rand::thread_rng();
    let s: String = (0..length)
        .map(|_| charset[rng.gen_range(0..charset.len())] as char)
        .collect();
    s.into()
}

/// `length` characters drawn uniformly from `[A-Za-z0-9]`.
pub fn generate_state(length: usize) -> SmolStr {
    random_string(STATE_CHARSET, length)
}

/// A code verifier drawn uniformly from `[A-Za-z0-9-._~]`.
///
/// When `length` is `None` or outside [`CODE_VERIFIER_LENGTH_RANGE`], a random
/// length inside the range is picked instead.
pub fn generate_code_verifier(length: Option<usize>) -> SmolStr {
    let length = match length {
        Some(n) if CODE_VERIFIER_LENGTH_RANGE.contains(&n) => n,
        _ => rand::thread_rng().gen_range(CODE_VERIFIER_LENGTH_RANGE),
    };
    random_string(CODE_VERIFIER_CHARSET, length)
}

/// `BASE64URL-ENCODE(SHA256(ASCII(verifier)))` without padding.
// https://datatracker.ietf.org/doc/html/rfc7636#section-4.2
pub fn s256_encode(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Derive the code challenge for `verifier` under `method`.
pub fn code_challenge(verifier: &str, method: &CodeChallengeMethod) -> Result<SmolStr> {
    match method {
        CodeChallengeMethod::Plain => Ok(verifier.into()),
        CodeChallengeMethod::S256 => Ok(s256_encode(verifier).into()),
        CodeChallengeMethod::Other(name) => Err(Error::UnsupportedChallengeMethod(name.clone())),
    }
}

/// Check a verifier against the PKCE length and alphabet rules.
pub fn validate_code_verifier(verifier: &str) -> Result<()> {
    let valid = CODE_VERIFIER_LENGTH_RANGE.contains(&verifier.len())
        && verifier.bytes().all(|b| CODE_VERIFIER_CHARSET.contains(&b));
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidCodeVerifier)
    }
}
