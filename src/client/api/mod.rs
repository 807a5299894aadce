//! API trait definitions split by resource
//!
//! - [`AuthApi`] - credential and refresh-token exchange
//! - [`AccountApi`] - registration and the signed-in account
//! - [`ApplicationApi`] - job applications and their pipeline
//! - [`TaskApi`] - to-do items
//! - [`JobOfferApi`] - collected job offers
//! - [`UserApi`] - user administration

mod account;
mod applications;
mod auth;
mod job_offers;
mod tasks;
mod users;

pub use account::AccountApi;
pub use applications::ApplicationApi;
pub use auth::AuthApi;
pub use job_offers::JobOfferApi;
pub use tasks::TaskApi;
pub use users::UserApi;
