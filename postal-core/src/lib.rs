//! Core library for the `postal` CLI.
//!
//! This crate defines:
//! - The fixed postal code list and lookup models
//! - Abstraction over geocoding providers, with a OneMap implementation
//! - The sequential lookup runner and its failure policy
//! - Distance filtering for the `nearby` command
//! - Configuration handling
//!
//! It is used by `postal-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod nearby;
pub mod provider;
pub mod runner;

pub use config::Config;
pub use error::LookupError;
pub use model::{Coordinate, LookupOutcome, LookupResult, POSTAL_CODES, PostalCode};
pub use provider::{GeocodeProvider, onemap::OneMapProvider};
pub use runner::{FailurePolicy, LookupRunner, RunSummary};
