//! # Outbound Ports (Driven Ports)
//!
//! Dependencies the weak block service requires from the host.

/// Seconds since the Unix epoch.
pub type Timestamp = u64;

/// Clock used to stamp accepted weak blocks.
///
/// Production: `SystemTimeSource`. Tests inject a controllable clock.
pub trait TimeSource: Send + Sync {
    /// Current timestamp in seconds since epoch.
    fn now(&self) -> Timestamp;
}
