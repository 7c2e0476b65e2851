//! The page context of the inspector.
//!
//! Everything here runs next to the inspected scene: the [`PageWindow`] slot
//! a host page publishes its scene into, the [`Detector`] that polls that
//! slot, the [`ScopeRegistry`] of discovered scenes, and the [`router`] that
//! executes inspector commands against the active one. [`PageContext::run`]
//! ties them to the relay through the typed channels of [`bus`].

pub mod bus;
pub mod context;
pub mod detector;
pub mod registry;
pub mod router;
pub mod window;

pub use bus::{PageEvent, PageNotice, PagePort, PageScript, RelayPort, page_bus};
pub use context::PageContext;
pub use detector::{Detection, Detector, DetectorConfig, DetectorState, MIN_POLL_INTERVAL};
pub use registry::{ScopeRecord, ScopeRegistry, ScopeSummary};
pub use window::PageWindow;
