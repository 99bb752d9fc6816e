#![allow(dead_code)]
use strata_core::ConfigMap;

/// Parses a YAML fixture. Panics if the YAML is invalid (intended for tests).
pub fn config_from_yaml(yaml: &str) -> ConfigMap {
    ConfigMap::from_yaml(yaml, "fixture").expect("Failed to create test config from YAML")
}

/// Returns a nested build configuration fixture.
pub fn pipeline_config() -> ConfigMap {
    config_from_yaml(
        r#"
image: node:20-alpine
cache:
  enabled: true
  paths:
    - node_modules
steps:
  - name: install
    run: npm ci
  - name: test
    run: npm test
timeout: 900
"#,
    )
}

/// Returns a template configuration fixture with mixed scalar types.
pub fn template_config() -> ConfigMap {
    config_from_yaml(
        r#"
replicas: 2
cpu_ratio: 0.5
debug: false
sidecar: ~
labels:
  team: payments
  tier: backend
"#,
    )
}
