//! Error types for the configuration repository engine.

use std::time::Duration;

use strata_core::CoreError;

/// Errors raised by a [`GitProvider`](crate::provider::GitProvider).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The group, project or file does not exist.
    #[error("{resource} not found: {path}")]
    NotFound { resource: String, path: String },

    /// The hosting service answered with an unexpected status.
    #[error("provider returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The call did not complete within the configured timeout.
    #[error("operation timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },

    /// The request conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl ProviderError {
    pub fn not_found(resource: impl Into<String>, path: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            path: path.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Coarse classification of a [`RepoError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    ProviderError,
    ParamInvalid,
    Aggregated,
}

impl ErrorKind {
    /// HTTP status the API layer reports for this kind.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::ParamInvalid => 400,
            ErrorKind::ProviderError | ErrorKind::Aggregated => 500,
        }
    }
}

/// Errors returned by [`ConfigRepoService`](crate::ConfigRepoService) and
/// [`RecycleBinManager`](crate::RecycleBinManager).
///
/// Every variant records the operation that failed so that the message
/// says where in the protocol the failure happened.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// A group, project or file needed by the operation is absent.
    #[error("{operation}: not found: {path}")]
    NotFound {
        operation: &'static str,
        path: String,
    },

    /// The hosting service failed.
    #[error("{operation} failed for {path}: {source}")]
    Provider {
        operation: &'static str,
        path: String,
        #[source]
        source: ProviderError,
    },

    /// Input or stored content could not be accepted.
    #[error("invalid parameter ({context}): {message}")]
    ParamInvalid { context: String, message: String },

    /// Several concurrent sub-operations failed.
    #[error(
        "{operation}: {} sub-operation(s) failed: {}",
        .errors.len(),
        join_messages(.errors)
    )]
    Aggregated {
        operation: &'static str,
        errors: Vec<RepoError>,
    },
}

fn join_messages(errors: &[RepoError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl RepoError {
    /// Wraps a provider failure with operation context.
    ///
    /// A provider `NotFound` becomes [`RepoError::NotFound`] so callers can
    /// match on absence without looking inside the provider error.
    pub fn provider(operation: &'static str, path: impl Into<String>, source: ProviderError) -> Self {
        let path = path.into();
        match source {
            ProviderError::NotFound { .. } => Self::NotFound { operation, path },
            source => Self::Provider {
                operation,
                path,
                source,
            },
        }
    }

    pub fn param_invalid(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParamInvalid {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Provider { .. } => ErrorKind::ProviderError,
            Self::ParamInvalid { .. } => ErrorKind::ParamInvalid,
            Self::Aggregated { .. } => ErrorKind::Aggregated,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Underlying causes of an aggregated failure, empty otherwise.
    pub fn causes(&self) -> &[RepoError] {
        match self {
            Self::Aggregated { errors, .. } => errors,
            _ => &[],
        }
    }
}

impl From<CoreError> for RepoError {
    fn from(err: CoreError) -> Self {
        let context = match &err {
            CoreError::InvalidApplication { .. } => "application".to_string(),
            CoreError::InvalidEnvironment { .. } => "environment".to_string(),
            CoreError::Parse { source_name, .. } => source_name.clone(),
            CoreError::Serialize { target, .. } => target.clone(),
        };
        Self::ParamInvalid {
            context,
            message: err.to_string(),
        }
    }
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, RepoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_not_found_is_lifted() {
        let err = RepoError::provider(
            "get_project",
            "applications/web/default",
            ProviderError::not_found("project", "applications/web/default"),
        );
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "get_project: not found: applications/web/default"
        );
    }

    #[test]
    fn test_provider_error_keeps_source() {
        use std::error::Error;

        let err = RepoError::provider(
            "write_files",
            "applications/web/default",
            ProviderError::Status {
                status: 502,
                message: "bad gateway".to_string(),
            },
        );
        assert_eq!(err.kind(), ErrorKind::ProviderError);
        assert!(err.source().is_some());
        assert!(err.to_string().contains("HTTP 502"));
    }

    #[test]
    fn test_aggregated_display() {
        let err = RepoError::Aggregated {
            operation: "soft_delete",
            errors: vec![
                RepoError::provider("transfer_project", "a/dev", ProviderError::Transport("reset".into())),
                RepoError::provider("transfer_project", "a/prod", ProviderError::Timeout { elapsed: Duration::from_secs(5) }),
            ],
        };

        let msg = err.to_string();
        assert!(msg.starts_with("soft_delete: 2 sub-operation(s) failed"));
        assert!(msg.contains("a/dev"));
        assert!(msg.contains("a/prod"));
        assert_eq!(err.causes().len(), 2);
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorKind::NotFound.http_status(), 404);
        assert_eq!(ErrorKind::ParamInvalid.http_status(), 400);
        assert_eq!(ErrorKind::ProviderError.http_status(), 500);
        assert_eq!(ErrorKind::Aggregated.http_status(), 500);
    }

    #[test]
    fn test_core_error_is_param_invalid() {
        let err: RepoError = CoreError::parse("pipeline.yaml", "bad indent").into();
        assert_eq!(err.kind(), ErrorKind::ParamInvalid);
        assert!(err.to_string().contains("pipeline.yaml"));
    }
}
