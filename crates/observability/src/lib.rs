//! Tracing/logging setup shared by every hospix process and test harness.

pub mod subscriber;

pub use subscriber::LogFormat;

/// Initialize process-wide observability (tracing/logging).
///
/// The output format comes from `HOSPIX_LOG_FORMAT` (`json` by default).
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    subscriber::init(LogFormat::from_env());
}

/// Initialize with an explicit output format, ignoring `HOSPIX_LOG_FORMAT`.
pub fn init_with(format: LogFormat) {
    subscriber::init(format);
}
