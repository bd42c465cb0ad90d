//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern: adapters are thin
//! translators between domain types and the flat-file layout under the data
//! directory. They contain no business logic.

pub mod persistence;
