//! Group and project path derivation.

use strata_core::{Application, CoreError, Environment, Result};

/// Paths for one (application, environment) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentPaths {
    /// The application's ConfigGroup.
    pub group: String,
    /// The EnvironmentProject inside the group.
    pub project: String,
    /// The effective environment (`default` when none was requested).
    pub environment: Environment,
}

/// Derives hierarchical paths for application configuration.
///
/// ```text
/// {applications_parent}/{application}                  ConfigGroup
/// {applications_parent}/{application}/{environment}    EnvironmentProject
/// {recycling_parent}/{application}-{id}                RecycleGroup
/// ```
///
/// Pure; performs no I/O.
#[derive(Debug, Clone)]
pub struct PathResolver {
    applications_parent: String,
    recycling_parent: String,
}

impl PathResolver {
    pub fn new(applications_parent: impl Into<String>, recycling_parent: impl Into<String>) -> Self {
        Self {
            applications_parent: trim_slashes(applications_parent.into()),
            recycling_parent: trim_slashes(recycling_parent.into()),
        }
    }

    /// Returns the ConfigGroup path.
    pub fn config_group(&self, app: &Application) -> Result<String> {
        validate_application(app)?;
        Ok(format!("{}/{}", self.applications_parent, app.name()))
    }

    /// Returns the EnvironmentProject path; an empty `environment` means `default`.
    pub fn environment_project(&self, app: &Application, environment: &str) -> Result<String> {
        Ok(self.resolve(app, environment)?.project)
    }

    /// Resolves both the group and project for an environment.
    pub fn resolve(&self, app: &Application, environment: &str) -> Result<EnvironmentPaths> {
        let group = self.config_group(app)?;
        let environment = Environment::new(environment);
        validate_segment(environment.as_str())
            .map_err(|reason| CoreError::invalid_environment(environment.as_str(), reason))?;

        Ok(EnvironmentPaths {
            project: format!("{}/{}", group, environment),
            group,
            environment,
        })
    }

    /// Returns the RecycleGroup name, `{application}-{id}`.
    pub fn recycle_group_name(&self, app: &Application) -> Result<String> {
        validate_application(app)?;
        Ok(format!("{}-{}", app.name(), app.id()))
    }

    /// Returns the RecycleGroup path.
    pub fn recycle_group(&self, app: &Application) -> Result<String> {
        Ok(format!(
            "{}/{}",
            self.recycling_parent,
            self.recycle_group_name(app)?
        ))
    }
}

fn trim_slashes(path: String) -> String {
    path.trim_matches('/').to_string()
}

fn validate_application(app: &Application) -> Result<()> {
    validate_segment(app.name()).map_err(|reason| CoreError::invalid_application(app.name(), reason))
}

fn validate_segment(segment: &str) -> std::result::Result<(), &'static str> {
    if segment.is_empty() {
        return Err("name cannot be empty");
    }
    if segment.contains('/') {
        return Err("name cannot contain '/'");
    }
    if segment == "." || segment == ".." {
        return Err("name cannot be a relative path component");
    }
    if !segment
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err("name may only contain ASCII letters, digits, '.', '_' and '-'");
    }
    if segment.starts_with(['-', '.']) {
        return Err("name cannot start with '-' or '.'");
    }
    if segment.ends_with(".git") || segment.ends_with(".atom") {
        return Err("name cannot end in '.git' or '.atom'");
    }
    Ok(())
}
