//! Request middleware.
//!
//! Purpose: Define middleware components for request lifecycle concerns such
//! as access logging.

pub mod request_log;

pub use request_log::RequestLog;
