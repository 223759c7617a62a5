//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod catalog;
pub mod clock;
pub mod persistence;
pub mod ports;
pub mod settings;
