//! Multi-user recipe box: domain model, flat-file stores, and HTTP pages.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
