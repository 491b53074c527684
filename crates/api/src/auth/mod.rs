//! Credentials: Argon2id password hashes and HS256 access tokens.

pub mod jwt;
pub mod password;
