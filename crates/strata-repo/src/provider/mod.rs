//! Git hosting provider abstraction.
//!
//! This module defines the contract the engine consumes and the two
//! implementations shipped with it.

mod gitlab;
mod memory;
mod traits;
mod types;

pub use gitlab::GitLabProvider;
pub use memory::MemoryProvider;
pub use traits::{GitProvider, ProviderResult};
pub use types::{Commit, CommitAction, FileAction, Group, Project};
