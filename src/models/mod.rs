//! Display models for CLI output
//!
//! Converts API response types into CLI-friendly rows for table and JSON
//! output.

pub mod display;

pub use display::{
    ApplicationCard, ApplicationDetail, ApplicationDisplay, BucketDisplay, OfferDisplay,
    SessionStatusDisplay, TaskCard, TaskDisplay, UserDisplay,
};
