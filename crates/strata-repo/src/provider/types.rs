//! Resource types exchanged with a Git hosting service.

use serde::{Deserialize, Serialize};

/// A group (namespace) in the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    pub name: String,
    /// Last path segment.
    pub path: String,
    /// Slash-separated path from the root namespace.
    pub full_path: String,
}

/// A project (repository) in the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    /// Last path segment.
    pub path: String,
    /// Full path including the owning group.
    pub path_with_namespace: String,
}

/// A commit produced by a multi-file write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    #[serde(default)]
    pub short_id: String,
    #[serde(default)]
    pub message: String,
}

/// The kind of change a [`CommitAction`] applies to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileAction {
    Create,
    Update,
    Move,
    Delete,
}

impl FileAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileAction::Create => "create",
            FileAction::Update => "update",
            FileAction::Move => "move",
            FileAction::Delete => "delete",
        }
    }
}

impl std::fmt::Display for FileAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file-level operation inside a multi-file commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAction {
    pub action: FileAction,
    pub file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl CommitAction {
    pub fn create(file_path: impl Into<String>, content: impl Into<String>) -> Self {
        Self::write(FileAction::Create, file_path, content)
    }

    pub fn update(file_path: impl Into<String>, content: impl Into<String>) -> Self {
        Self::write(FileAction::Update, file_path, content)
    }

    /// A create or update, as chosen by the caller.
    pub fn write(
        action: FileAction,
        file_path: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            action,
            file_path: file_path.into(),
            previous_path: None,
            content: Some(content.into()),
        }
    }

    pub fn move_file(previous_path: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            action: FileAction::Move,
            file_path: file_path.into(),
            previous_path: Some(previous_path.into()),
            content: None,
        }
    }

    pub fn delete(file_path: impl Into<String>) -> Self {
        Self {
            action: FileAction::Delete,
            file_path: file_path.into(),
            previous_path: None,
            content: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_wire_format() {
        let action = CommitAction::create("pipeline.yaml", "image: go\n");
        let json = serde_json::to_value(&action).unwrap();

        assert_eq!(json["action"], "create");
        assert_eq!(json["file_path"], "pipeline.yaml");
        assert!(json.get("previous_path").is_none());

        let json = serde_json::to_value(CommitAction::move_file("a.yaml", "b.yaml")).unwrap();
        assert_eq!(json["action"], "move");
        assert_eq!(json["previous_path"], "a.yaml");
        assert!(json.get("content").is_none());
    }
}
