//! Authentication primitives.
//!
//! - [`jwt`] -- bearer token validation.
//! - [`password`] -- Argon2id hashing for passwords submitted at registration.

pub mod jwt;
pub mod password;
