//! Repositories: zero-sized structs whose async methods take `&PgPool`.

pub mod donation_history_repo;
pub mod donation_request_repo;
pub mod summary_repo;
pub mod user_repo;

pub use donation_history_repo::DonationHistoryRepo;
pub use donation_request_repo::{DonationRequestRepo, TransitionOutcome};
pub use summary_repo::SummaryRepo;
pub use user_repo::UserRepo;
