//! Common utilities and types shared across rendezvous

pub mod config;
pub mod error;
pub mod tracing_middleware;
pub mod utils;

pub use config::Config;
pub use error::{Error, Result};
pub use tracing_middleware::{request_tracing_middleware, REQUEST_ID_HEADER};
pub use utils::{encode_key, key_from_path, parse_duration};
