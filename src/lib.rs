//! # rendezvous
//!
//! A small shared-state coordination service for local deployment and test
//! pipelines:
//! - Named string values published and fetched over plain HTTP
//! - Blocking reads: `GET /{key}` waits until someone posts the key
//! - Optional write-through JSON snapshot so state survives restarts
//!
//! ## Architecture
//!
//! ```text
//!  deploy script        test runner        seed script
//!       │ POST /addr         │ GET /addr        │ GET /
//!       └──────────┬─────────┴──────────────────┘
//!                  │ HTTP
//!        ┌─────────▼──────────┐
//!        │ controller (axum)  │
//!        │  Store: RwLock map │──► state.json (snapshot)
//!        └────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ### Start the controller
//! ```bash
//! rendezvous-controller serve --bind 0.0.0.0:6001 --state-file ./state.json
//! ```
//!
//! ### Use the CLI
//! ```bash
//! # Publish a value
//! rendezvous set contract-address 0xdeadbeef
//!
//! # Wait for a value (blocks until it is set)
//! rendezvous get contract-address
//!
//! # Dump everything
//! rendezvous list
//! ```

pub mod client;
pub mod common;
pub mod controller;

// Re-export commonly used types
pub use client::ControllerClient;
pub use common::{Config, Error, Result};
pub use controller::Controller;

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
