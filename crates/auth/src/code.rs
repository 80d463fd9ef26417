//! Verification code generation.

use rand::Rng;

/// Number of decimal digits in a verification code.
pub const CODE_LEN: usize = 6;

/// Generate a random 6-digit verification code, zero-padded.
pub fn generate_verification_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{n:06}")
}
