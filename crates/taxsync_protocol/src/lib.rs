//! # TaxSync Protocol
//!
//! Customer data model and wire types for TaxSync.
//!
//! This crate provides:
//! - `CustomerSnapshot`, the immutable view of a local customer at event time
//! - `SyncPayload` and the record mapper that derives it from a snapshot
//! - `SyncEvent` for the created/updated/deleted triggers
//! - `RemoteResponse` and `FailureSignal` for the remote API contract
//! - Region resolution and snapshot assembly from host customer records
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod event;
mod payload;
mod region;
mod response;
mod snapshot;

pub use error::{ProtocolError, ProtocolResult};
pub use event::{EventKind, SyncEvent};
pub use payload::{map, SyncPayload};
pub use region::{LocalCustomer, RegionResolver, SnapshotBuilder, StaticRegionResolver};
pub use response::{FailureSignal, RemoteResponse};
pub use snapshot::{
    Address, CustomerId, CustomerSnapshot, ExemptRegion, ExemptionType, SyncTimestamp,
};

/// Remote resource type for customers.
pub const CUSTOMERS_RESOURCE: &str = "customers";
