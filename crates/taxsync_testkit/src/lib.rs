//! # TaxSync Testkit
//!
//! Test utilities for TaxSync.
//!
//! This crate provides:
//! - Customer snapshot fixtures and a scripted reconciliation harness
//! - Property-based test generators using proptest
//! - Loopback wiring between the engine and the reference service
//!
//! ## Usage
//!
//! ```rust,ignore
//! use taxsync_testkit::prelude::*;
//!
//! #[test]
//! fn create_falls_back_to_update() {
//!     let harness = TestHarness::new();
//!     harness.remote().push_create(Err(failure(422)));
//!     harness.remote().push_update(confirmed("1"));
//!     assert!(harness.created(&new_customer("1")).confirmed);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod integration;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
}

pub use fixtures::*;
pub use generators::*;
pub use integration::*;
