//! Domain core for the blood donation matching service.
//!
//! Pure logic with no I/O: the request lifecycle state machine, blood group
//! canonicalization, typed search filters, pagination clamps, payload
//! validation, and the district/upazila reference resolver. Both the
//! repository layer and the HTTP layer build on these types.

pub mod blood_group;
pub mod donation;
pub mod donor;
pub mod error;
pub mod filter;
pub mod geo;
pub mod pagination;
pub mod roles;
pub mod types;
pub mod validation;
