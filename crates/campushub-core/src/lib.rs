//! # campushub-core
//!
//! Core crate for the CampusHub notification subsystem. Contains trait
//! seams for external collaborators, configuration schemas, typed
//! identifiers, pagination types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other CampusHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
