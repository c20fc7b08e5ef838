//! Rule library layer for the yabre decision engine
//!
//! This crate scans a collection of rule-set documents, records each
//! document's name and declared dependencies, and resolves a named rule set
//! into one merged [`yabre_core::Rules`] graph.
//!
//! # Quick Start
//!
//! ```no_run
//! use yabre_repository::{LibrarySettings, RulesLibrary};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let library = RulesLibrary::new(LibrarySettings::new().with_base_path("rules"))?;
//! let rules = library.load_rules("loan-approval")?;
//! println!("{} conditions", rules.len());
//! # Ok(())
//! # }
//! ```
//!
//! Documents can come from disk ([`FileSystemSource`]) or from memory
//! ([`MemorySource`]), e.g. rules compiled into the binary with
//! `include_str!`.

pub mod error;
pub mod file_system;
pub mod library;
pub mod memory;
pub mod traits;

pub use error::{RepositoryError, RepositoryResult};
pub use file_system::FileSystemSource;
pub use library::{LibrarySettings, RulesLibrary};
pub use memory::MemorySource;
pub use traits::RuleSource;
