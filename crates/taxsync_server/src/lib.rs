//! # TaxSync Server
//!
//! Reference in-memory customer service for TaxSync.
//!
//! This crate provides:
//! - Customer endpoints (`POST /customers`, `PUT /customers/{id}`, `DELETE /customers/{id}`)
//! - An in-memory customer store
//! - Fault injection and a null-resource mode for exercising client fallbacks
//!
//! # Contract
//!
//! - Success bodies are `{"customer": <record>}`; the record may be `null`
//! - Creating an existing customer answers 422
//! - Updating or deleting an unknown customer answers 404
//! - Error bodies are `{"status": N, "error": <reason>, "detail": <message>}`
//!
//! The service does no network I/O; requests are handed to
//! [`TaxService::handle`] directly, typically through a loopback client.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod handler;
mod server;
mod store;

pub use config::ServiceConfig;
pub use error::{reason_phrase, ServiceError, ServiceResult};
pub use handler::{HandlerContext, RequestHandler, ServiceResponse};
pub use server::TaxService;
pub use store::{CustomerStore, StoredCustomer};
