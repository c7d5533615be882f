pub mod admin;
pub mod donation_request;
pub mod donor;
pub mod geo;
pub mod user;
