//! `talentbridge-auth`: pure authentication boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: password
//! hashing, session-token issuance/verification, and verification-code
//! generation. Transport-level concerns (cookie/header handling, middleware)
//! live elsewhere.

pub mod code;
pub mod password;
pub mod token;

pub use code::generate_verification_code;
pub use password::{hash_password, verify_password, PasswordError};
pub use token::{SessionClaims, TokenError, TokenIssuer};
