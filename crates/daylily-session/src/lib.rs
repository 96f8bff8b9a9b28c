//! In-memory session registry for the Daylily server.
//!
//! Tracks opaque session identifiers with a sliding expiration window. Each
//! successful lookup resets the clock for that session. Expired entries are
//! evicted lazily: either when a lookup finds them stale, or when a caller
//! runs [`SessionRegistry::cleanup`]. Nothing in this crate spawns threads or
//! timers, so [`SessionRegistry::active_count`] may include sessions that have
//! already expired but have not been swept yet.
//!
//! The registry is an explicitly constructed value. Clones share the same
//! underlying map, which makes it suitable for storing in application state
//! and handing to request handlers.
//!
//! ```rust
//! use daylily_session::SessionRegistry;
//!
//! let registry = SessionRegistry::new();
//! let id = registry.get_or_create(None);
//! assert_eq!(registry.get_or_create(Some(id.as_str())), id);
//! ```

mod clock;
mod registry;

pub use clock::{Clock, SystemClock};
pub use registry::{SessionRegistry, DEFAULT_SESSION_TIMEOUT};
