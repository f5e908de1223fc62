pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::file::FileStore;
pub use adapters::memory::{MemoryDirectory, MemoryStore};
pub use config::RegistryConfig;
pub use core::engine::RosterEngine;
pub use domain::model::{Enrollment, GroupRef, IndividualRef, Period};
pub use domain::ports::{EnrollmentStore, IdentityDirectory};
pub use utils::error::{Result, RosterError};
