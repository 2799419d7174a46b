//! Actor runtime and the I/O actors that feed the catalog controller.
//!
//! - [`actor`]: mailbox-driven `Actor` trait, addresses, reserved spawns
//! - [`system`] / [`builder`]: task tracking, wiring and shutdown
//! - [`loader`]: the single dataset fetch
//! - [`images`]: image reachability probes
pub mod actor;
pub mod builder;
pub mod images;
pub mod loader;
pub mod system;

pub use images::{ImageProber, ProbeCmd, ProbeOutcome};
pub use loader::{DatasetLoader, DatasetReply, LoaderMsg};
