//! Tracing and logging setup shared by binaries and tests.

/// Initialize process-wide tracing with the default filter (`info`).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Subscriber configuration (filters, formatting).
pub mod tracing;

pub use crate::tracing::{DEFAULT_FILTER, init_with_default};
