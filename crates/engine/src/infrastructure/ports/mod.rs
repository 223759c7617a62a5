//! Port traits for infrastructure boundaries.
//!
//! Ports exist for:
//! - Character storage (local directory, in-memory, account sync service)
//! - Reference and spell catalogs (bundled files or a data directory)
//! - Clock/Random (for testing)

mod error;
mod repos;
mod testing;

pub use error::RepoError;
pub use repos::*;
pub use testing::*;
