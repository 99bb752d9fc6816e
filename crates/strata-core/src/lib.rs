//! Strata Core - Domain types
//!
//! Identity newtypes and structured configuration documents shared by
//! the Strata configuration repository engine and its callers.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ConfigMap, ConfigValue};
pub use error::{CoreError, Result};
pub use types::{Actor, Application, DEFAULT_ENVIRONMENT, Environment};

