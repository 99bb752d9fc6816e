//! Read and write result types.

use serde::Serialize;
use strata_core::ConfigMap;

use crate::layout::ConfigFile;
use crate::provider::{Commit, FileAction};

/// The configuration stored for one environment.
///
/// Each field is `None` when the corresponding file does not exist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationConfig {
    pub manifest: Option<ConfigMap>,
    pub pipeline: Option<ConfigMap>,
    pub application: Option<ConfigMap>,
}

impl ApplicationConfig {
    pub fn file(&self, file: ConfigFile) -> Option<&ConfigMap> {
        match file {
            ConfigFile::Manifest => self.manifest.as_ref(),
            ConfigFile::Pipeline => self.pipeline.as_ref(),
            ConfigFile::Application => self.application.as_ref(),
        }
    }

    pub(crate) fn set(&mut self, file: ConfigFile, map: ConfigMap) {
        let slot = match file {
            ConfigFile::Manifest => &mut self.manifest,
            ConfigFile::Pipeline => &mut self.pipeline,
            ConfigFile::Application => &mut self.application,
        };
        *slot = Some(map);
    }

    /// Version recorded in `manifest.yaml`, if any.
    pub fn version(&self) -> Option<&str> {
        self.manifest.as_ref()?.get("version")?.as_str()
    }

    /// Returns true when none of the files exist.
    pub fn is_empty(&self) -> bool {
        self.manifest.is_none() && self.pipeline.is_none() && self.application.is_none()
    }
}

/// Outcome of a successful `create_or_update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    /// Whether the files were created or updated.
    pub action: FileAction,
    /// The commit holding the change.
    pub commit: Commit,
}
