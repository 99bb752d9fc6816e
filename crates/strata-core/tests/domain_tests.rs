use strata_core::{Actor, Application, ConfigValue, CoreError, DEFAULT_ENVIRONMENT, Environment};

mod common;

#[test]
fn test_environment_default_normalization() {
    let empty = Environment::new("");
    assert!(empty.is_default());
    assert_eq!(empty.as_str(), DEFAULT_ENVIRONMENT);
    assert_eq!(empty, Environment::from(DEFAULT_ENVIRONMENT));
    assert_eq!(Environment::from(String::from("qa")).to_string(), "qa");
}

#[test]
fn test_application_identity() {
    let app = Application::new("checkout", 42);
    let reused = Application::new("checkout", 43);

    assert_eq!(app.name(), reused.name());
    assert_ne!(app, reused);
    assert_eq!(reused.to_string(), "checkout#43");
}

#[test]
fn test_actor_round_trip() {
    let actor = Actor::new("ci-bot").with_email("ci@example.com");
    let json = serde_json::to_string(&actor).unwrap();
    let back: Actor = serde_json::from_str(&json).unwrap();

    assert_eq!(back, actor);
    assert_eq!(back.email(), Some("ci@example.com"));

    let bare: Actor = serde_json::from_str(r#"{"name":"alice"}"#).unwrap();
    assert_eq!(bare.email(), None);
}

#[test]
fn test_nested_lookup() {
    let config = common::pipeline_config();

    assert_eq!(config.get("image").and_then(|v| v.as_str()), Some("node:20-alpine"));
    assert_eq!(config.get("cache.enabled").and_then(ConfigValue::as_bool), Some(true));
    assert_eq!(config.get("timeout").and_then(ConfigValue::as_i64), Some(900));
    assert_eq!(
        config
            .get("steps")
            .and_then(|v| v.as_array())
            .map(|steps| steps.len()),
        Some(2)
    );
    assert!(config.get("cache.enabled.deeper").is_none());
    assert!(config.get("").is_none());
}

#[test]
fn test_scalar_types() {
    let config = common::template_config();

    assert_eq!(config.get("replicas").map(ConfigValue::type_name), Some("integer"));
    assert_eq!(config.get("cpu_ratio").and_then(ConfigValue::as_f64), Some(0.5));
    assert_eq!(config.get("debug").and_then(ConfigValue::as_bool), Some(false));
    assert!(config.get("sidecar").is_some_and(ConfigValue::is_null));
    assert_eq!(config.get("labels").map(ConfigValue::type_name), Some("object"));
}

#[test]
fn test_error_classification() {
    let err = CoreError::invalid_environment("a/b", "must not contain '/'");
    assert!(err.is_invalid_input());
    assert!(!err.is_parse());
    assert!(err.to_string().contains("a/b"));

    let err = CoreError::parse("pipeline.yaml", "bad indentation");
    assert!(err.is_parse());
    assert!(!err.is_invalid_input());
}
