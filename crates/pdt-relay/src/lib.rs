//! The content relay: the only context that can talk to both the page and
//! the inspector panel.
//!
//! [`RelayBridge`] injects the page scripts in stages and answers liveness
//! probes itself. Scene commands are forwarded into the page and each reply
//! is paired with its request by correlation id.

pub mod bridge;
pub mod error;

pub use bridge::{NOT_DETECTED, RelayBridge, RelayConfig};
pub use error::RelayError;
