//! Controller: the coordination store served over HTTP
//!
//! The controller is responsible for:
//! - Holding the key → value map behind one lock
//! - Blocking reads that poll until a key is set
//! - Write-through JSON snapshots (optional)
//! - The HTTP API

pub mod http;
pub mod server;
pub mod snapshot;
pub mod store;

pub use server::Controller;
pub use snapshot::{Entries, SnapshotFile};
pub use store::{Store, WriteOutcome};
