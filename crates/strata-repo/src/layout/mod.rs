//! Where application configuration lives inside the hosting service.

mod files;
mod paths;

pub use files::ConfigFile;
pub use paths::{EnvironmentPaths, PathResolver};
