//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` struct matching the database row
//! - A `Serialize` response shape where the row is not exposed directly
//! - `Deserialize` request bodies, validated with `validator` derives

pub mod donation_history;
pub mod donation_request;
pub mod summary;
pub mod user;
