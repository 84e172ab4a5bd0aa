//! DAO module
//!
//! Registry entries, the guild → DAO directory, and registry lookups.

mod directory;
mod registry;
mod types;

pub use directory::DaoDirectory;
pub use registry::{DaoRegistry, StaticRegistry};
pub use types::*;
