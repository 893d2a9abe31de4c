//! Backend library modules.
//!
//! Domain services for the code-gated consultation and loan registration
//! workflows, the ports they drive, and the outbound adapters implementing
//! those ports. Transport wiring lives with the embedding application.

pub mod domain;
pub mod outbound;
pub mod telemetry;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
