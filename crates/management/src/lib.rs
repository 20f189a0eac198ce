//! Sales-training application backend — leads, prompts, practice calls,
//! and the analytics endpoints behind the dashboard.
//!
//! Data stored in DashMap (development); swap to PostgreSQL for production.

pub mod auth;
pub mod handlers;
pub mod models;
pub mod router;
pub mod store;

pub use handlers::CoachState;
pub use router::coach_router;
pub use store::CoachStore;
