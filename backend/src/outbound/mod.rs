//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern, providing
//! concrete implementations of domain port traits:
//!
//! - **cache**: the ephemeral code store (in-memory and Redis-backed)
//! - **persistence**: in-memory customer directory and loan ledger
//! - **notify**: log-sink notification dispatch
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod cache;
pub mod notify;
pub mod persistence;
