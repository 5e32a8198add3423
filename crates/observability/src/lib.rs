//! Tracing/logging setup shared by the console binaries.

/// Initialize process-wide logging.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init(format: LogFormat) {
    tracing::init(format);
}

/// Subscriber configuration (filters, formatting).
pub mod tracing;

pub use self::tracing::LogFormat;
