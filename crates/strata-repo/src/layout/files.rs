//! Fixed files inside an EnvironmentProject.

/// One of the three configuration files kept per environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigFile {
    /// `manifest.yaml`: `{version: <string>}`
    Manifest,
    /// `pipeline.yaml`: build configuration
    Pipeline,
    /// `application.yaml`: template/runtime configuration
    Application,
}

impl ConfigFile {
    /// All files, in commit order.
    pub const ALL: [ConfigFile; 3] = [
        ConfigFile::Manifest,
        ConfigFile::Pipeline,
        ConfigFile::Application,
    ];

    /// Path of the file relative to the project root.
    pub fn path(&self) -> &'static str {
        match self {
            ConfigFile::Manifest => "manifest.yaml",
            ConfigFile::Pipeline => "pipeline.yaml",
            ConfigFile::Application => "application.yaml",
        }
    }
}

impl std::fmt::Display for ConfigFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}
