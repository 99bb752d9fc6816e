//! Write request type.

use strata_core::ConfigMap;

use crate::layout::ConfigFile;

/// The configuration categories to write in one `create_or_update` call.
///
/// Categories left as `None` are not touched: their files keep their
/// last committed content.
///
/// ```
/// use strata_core::ConfigMap;
/// use strata_repo::ConfigUpdate;
///
/// let update = ConfigUpdate::new()
///     .version("1.4.0")
///     .pipeline(ConfigMap::new().with("image", "golang:1.22"));
/// assert!(!update.is_empty());
/// assert!(ConfigUpdate::new().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigUpdate {
    pub version: Option<String>,
    pub pipeline: Option<ConfigMap>,
    pub application: Option<ConfigMap>,
}

impl ConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn pipeline(mut self, pipeline: ConfigMap) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    pub fn application(mut self, application: ConfigMap) -> Self {
        self.application = Some(application);
        self
    }

    /// Returns true when no category was supplied.
    pub fn is_empty(&self) -> bool {
        self.version.is_none() && self.pipeline.is_none() && self.application.is_none()
    }

    /// The documents to commit, one per supplied category, in file order.
    pub(crate) fn into_documents(self) -> Vec<(ConfigFile, ConfigMap)> {
        let manifest = self
            .version
            .map(|version| ConfigMap::new().with("version", version));

        [
            (ConfigFile::Manifest, manifest),
            (ConfigFile::Pipeline, self.pipeline),
            (ConfigFile::Application, self.application),
        ]
        .into_iter()
        .filter_map(|(file, doc)| doc.map(|doc| (file, doc)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_skip_missing_categories() {
        let docs = ConfigUpdate::new()
            .version("2.0.0")
            .application(ConfigMap::new().with("replicas", 3))
            .into_documents();

        let files: Vec<_> = docs.iter().map(|(file, _)| *file).collect();
        assert_eq!(files, vec![ConfigFile::Manifest, ConfigFile::Application]);
        assert_eq!(docs[0].1.get("version").and_then(|v| v.as_str()), Some("2.0.0"));
    }

    #[test]
    fn test_empty_maps_still_count() {
        let update = ConfigUpdate::new().pipeline(ConfigMap::new());
        assert!(!update.is_empty());
        assert_eq!(update.into_documents().len(), 1);
    }
}
