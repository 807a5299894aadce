//! Display model implementations for table and JSON output
//!
//! Display models transform API response types into CLI-friendly formats
//! with appropriate column names and serialization.

mod application;
mod common;
mod offer;
mod session;
mod task;
mod user;

pub use application::{ApplicationCard, ApplicationDetail, ApplicationDisplay};
pub use offer::{BucketDisplay, OfferDisplay};
pub use session::SessionStatusDisplay;
pub use task::{TaskCard, TaskDisplay};
pub use user::UserDisplay;
