#[cfg(feature = "cli")]
pub mod cli;
pub mod registry;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
pub use registry::RegistryConfig;
