//! Logging setup shared by the shoplist binaries and tests.

pub mod tracing;

pub use crate::tracing::{LogFormat, init, init_with};
