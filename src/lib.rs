//! Analysis core for an interactive used-car listings EDA dashboard.
//!
//! The crate owns the data model, cleaning, filtering, and the
//! chart-selection logic; rendering and page layout belong to an external
//! presentation layer that consumes the typed payloads produced here.

pub mod analysis;
pub mod data;
pub mod error;

pub use error::{EdaError, Result};
