//! Character sheet application shell.
//!
//! ## Structure
//!
//! - `use_cases/` - Character management, spell browsing and dice
//! - `infrastructure/` - Ports and their adapters (stores, catalog, clock)
//! - `cli` - Command-line front end
//! - `app` - Application composition

pub mod app;
pub mod cli;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
