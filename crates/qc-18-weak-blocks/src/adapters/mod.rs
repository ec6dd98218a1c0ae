//! # Adapters
//!
//! - `time`: system clock implementing `TimeSource`

pub mod time;

pub use time::SystemTimeSource;
