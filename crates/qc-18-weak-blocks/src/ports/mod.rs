//! # Ports
//!
//! - `inbound`: the API this subsystem offers (`WeakBlockApi`)
//! - `outbound`: what it needs from the host (`TimeSource`)

pub mod inbound;
pub mod outbound;

pub use inbound::WeakBlockApi;
pub use outbound::{TimeSource, Timestamp};
