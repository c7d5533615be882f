//! Caller extraction and role checks.
//!
//! - [`auth::AuthUser`] -- the authenticated caller, from a JWT Bearer token.
//! - [`rbac::RequireModerator`] -- `admin` or `volunteer`.
//! - [`rbac::RequireAdmin`] -- `admin` only.

pub mod auth;
pub mod rbac;
