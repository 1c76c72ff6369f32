//! Core traits defined in `campushub-core` and implemented by other crates.
//!
//! These are the seams to the subsystem's external collaborators: the
//! user/organization directory and the live-session registry. Production
//! implementations live in `campushub-database` and `campushub-realtime`;
//! tests substitute in-memory fakes.

pub mod directory;
pub mod session_registry;

pub use directory::Directory;
pub use session_registry::SessionRegistry;
