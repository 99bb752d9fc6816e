//! Structured commit messages.
//!
//! Every mutation the engine commits carries a message of the form
//!
//! ```text
//! config(checkout): alice update staging
//!
//! {"actor":{"name":"alice"},"action":"update","environment":"staging","pipeline":{...}}
//! ```
//!
//! The header is for humans; the single-line JSON body is what audit
//! tooling reads back with [`CommitMessage::parse`].

use serde::{Deserialize, Serialize};
use strata_core::{Actor, Application, ConfigMap, Environment};

use crate::error::{RepoError, Result};
use crate::layout::ConfigFile;
use crate::provider::FileAction;

const DEFAULT_KIND: &str = "config";

/// Machine-readable part of a commit message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitBody {
    pub actor: Actor,
    pub action: FileAction,
    pub environment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<ConfigMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<ConfigMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<ConfigMap>,
}

impl CommitBody {
    /// Returns the payload recorded for a file, if it was touched.
    pub fn payload(&self, file: ConfigFile) -> Option<&ConfigMap> {
        match file {
            ConfigFile::Manifest => self.manifest.as_ref(),
            ConfigFile::Pipeline => self.pipeline.as_ref(),
            ConfigFile::Application => self.application.as_ref(),
        }
    }
}

/// A parsed commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    pub kind: String,
    pub scope: String,
    pub actor: String,
    pub action: String,
    pub subject: String,
    pub body: CommitBody,
}

impl CommitMessage {
    /// Renders the header line.
    pub fn header(&self) -> String {
        format!(
            "{}({}): {} {} {}",
            self.kind, self.scope, self.actor, self.action, self.subject
        )
    }

    /// Renders the full message.
    pub fn render(&self) -> Result<String> {
        let body = serde_json::to_string(&self.body)
            .map_err(|e| RepoError::param_invalid("commit message", e.to_string()))?;
        Ok(format!("{}\n\n{}", self.header(), body))
    }

    /// Parses a message produced by [`CommitMessageBuilder`].
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = |reason: &str| RepoError::param_invalid("commit message", reason);

        let (header, body) = text
            .split_once("\n\n")
            .ok_or_else(|| invalid("missing body"))?;

        let (prefix, rest) = header
            .split_once("): ")
            .ok_or_else(|| invalid("malformed header"))?;
        let (kind, scope) = prefix
            .split_once('(')
            .ok_or_else(|| invalid("missing scope"))?;

        let mut tail = rest.rsplitn(3, ' ');
        let subject = tail.next().filter(|s| !s.is_empty());
        let action = tail.next().filter(|s| !s.is_empty());
        let actor = tail.next().filter(|s| !s.is_empty());
        let (Some(subject), Some(action), Some(actor)) = (subject, action, actor) else {
            return Err(invalid("header must read '<actor> <action> <subject>'"));
        };

        let body: CommitBody = serde_json::from_str(body.trim())
            .map_err(|e| RepoError::param_invalid("commit message", e.to_string()))?;

        Ok(Self {
            kind: kind.to_string(),
            scope: scope.to_string(),
            actor: actor.to_string(),
            action: action.to_string(),
            subject: subject.to_string(),
            body,
        })
    }
}

/// Renders commit messages for configuration writes.
#[derive(Debug, Clone)]
pub struct CommitMessageBuilder {
    kind: String,
}

impl Default for CommitMessageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CommitMessageBuilder {
    pub fn new() -> Self {
        Self {
            kind: DEFAULT_KIND.to_string(),
        }
    }

    /// Overrides the header kind (`config` by default).
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Builds the message for one write.
    ///
    /// `changes` lists the files staged in the commit together with the
    /// document written to each.
    pub fn build(
        &self,
        actor: &Actor,
        action: FileAction,
        app: &Application,
        environment: &Environment,
        changes: &[(ConfigFile, &ConfigMap)],
    ) -> CommitMessage {
        let mut body = CommitBody {
            actor: actor.clone(),
            action,
            environment: environment.to_string(),
            manifest: None,
            pipeline: None,
            application: None,
        };
        for (file, payload) in changes {
            let slot = match file {
                ConfigFile::Manifest => &mut body.manifest,
                ConfigFile::Pipeline => &mut body.pipeline,
                ConfigFile::Application => &mut body.application,
            };
            *slot = Some((*payload).clone());
        }

        CommitMessage {
            kind: self.kind.clone(),
            scope: app.name().to_string(),
            actor: header_actor(actor),
            action: action.to_string(),
            subject: environment.to_string(),
            body,
        }
    }
}

/// Collapses whitespace so the actor cannot break the header line.
fn header_actor(actor: &Actor) -> String {
    let name = actor.name().split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        "unknown".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> ConfigMap {
        ConfigMap::new().with("image", "golang:1.22").with("steps", vec!["build", "test"])
    }

    #[test]
    fn test_header_format() {
        let payload = pipeline();
        let message = CommitMessageBuilder::new().build(
            &Actor::new("alice"),
            FileAction::Update,
            &Application::new("checkout", 3),
            &Environment::new("staging"),
            &[(ConfigFile::Pipeline, &payload)],
        );

        assert_eq!(message.header(), "config(checkout): alice update staging");

        let rendered = message.render().unwrap();
        let (_, body) = rendered.split_once("\n\n").unwrap();
        assert!(!body.contains('\n'));
        assert!(body.contains(r#""action":"update""#));
        assert!(body.contains(r#""pipeline":{"image":"golang:1.22""#));
        assert!(!body.contains("application"));
    }

    #[test]
    fn test_parse_round_trip() {
        let payload = pipeline();
        let actor = Actor::new("Bob  Smith\n").with_email("bob@example.com");
        let message = CommitMessageBuilder::new().with_kind("chore").build(
            &actor,
            FileAction::Create,
            &Application::new("checkout", 3),
            &Environment::default(),
            &[(ConfigFile::Pipeline, &payload)],
        );

        let parsed = CommitMessage::parse(&message.render().unwrap()).unwrap();
        assert_eq!(parsed.kind, "chore");
        assert_eq!(parsed.scope, "checkout");
        assert_eq!(parsed.actor, "Bob Smith");
        assert_eq!(parsed.action, "create");
        assert_eq!(parsed.subject, "default");
        assert_eq!(parsed.body.actor.email(), Some("bob@example.com"));
        assert_eq!(parsed.body.payload(ConfigFile::Pipeline), Some(&payload));
        assert_eq!(parsed.body.payload(ConfigFile::Manifest), None);
    }

    #[test]
    fn test_parse_rejects_free_text() {
        assert!(CommitMessage::parse("fix typo").is_err());
        assert!(CommitMessage::parse("config(app): alice\n\n{}").is_err());
        assert!(CommitMessage::parse("config(app): alice update dev\n\nnot json").is_err());
    }
}
