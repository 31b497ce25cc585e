//! Structured logging for PostLens.
//!
//! Console output plus daily-rolling NDJSON files, with a redaction helper
//! for scrubbing credentials out of anything that ends up in a log line.

pub mod logger;
pub mod redact;

pub use logger::init_logger;
pub use redact::redact_sensitive_data;
