use crate::config::value::ConfigValue;
use crate::error::{CoreError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An order-preserving key-value configuration document.
///
/// This is the in-memory form of `pipeline.yaml`, `application.yaml` and
/// `manifest.yaml`. Insertion order is kept so that a document rendered
/// to YAML and committed produces a stable, reviewable diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConfigMap {
    #[serde(flatten)]
    inner: IndexMap<String, ConfigValue>,
}

impl ConfigMap {
    pub fn new() -> Self {
        Self {
            inner: IndexMap::new(),
        }
    }

    pub fn from_inner(inner: IndexMap<String, ConfigValue>) -> Self {
        Self { inner }
    }

    pub fn as_inner(&self) -> &IndexMap<String, ConfigValue> {
        &self.inner
    }

    pub fn into_inner(self) -> IndexMap<String, ConfigValue> {
        self.inner
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Inserts a top-level key, returning the previous value if any.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ConfigValue>,
    ) -> Option<ConfigValue> {
        self.inner.insert(key.into(), value.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Looks up a value, descending into nested objects on `.`.
    ///
    /// # Example
    ///
    /// ```
    /// use strata_core::ConfigMap;
    ///
    /// let map = ConfigMap::from_yaml("build:\n  image: golang:1.22\n", "pipeline.yaml").unwrap();
    /// assert_eq!(map.get("build.image").and_then(|v| v.as_str()), Some("golang:1.22"));
    /// assert!(map.get("build.missing").is_none());
    /// ```
    pub fn get(&self, path: &str) -> Option<&ConfigValue> {
        if path.is_empty() {
            return None;
        }

        let mut parts = path.split('.');
        let mut current = self.inner.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// Parses a YAML document. `source_name` is reported on failure.
    ///
    /// An empty document parses to an empty map.
    pub fn from_yaml(yaml: &str, source_name: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::new());
        }
        serde_yaml::from_str(yaml).map_err(|e| CoreError::parse(source_name, e.to_string()))
    }

    /// Parses raw YAML bytes as read from a repository file.
    pub fn from_yaml_slice(bytes: &[u8], source_name: &str) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| CoreError::parse(source_name, format!("invalid UTF-8: {}", e)))?;
        Self::from_yaml(text, source_name)
    }

    /// Renders the map as block-style YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| CoreError::serialize("yaml", e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CoreError::parse("json", e.to_string()))
    }

    /// Renders the map as single-line JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| CoreError::serialize("json", e.to_string()))
    }
}

impl From<IndexMap<String, ConfigValue>> for ConfigMap {
    fn from(inner: IndexMap<String, ConfigValue>) -> Self {
        Self { inner }
    }
}

impl From<ConfigMap> for ConfigValue {
    fn from(map: ConfigMap) -> Self {
        ConfigValue::Object(map.inner)
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            inner: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_access() {
        let yaml = r#"
deploy:
  replicas: 2
  resources:
    cpu: 500m
"#;
        let map = ConfigMap::from_yaml(yaml, "application.yaml").unwrap();

        assert_eq!(map.get("deploy.replicas").unwrap().as_i64(), Some(2));
        assert_eq!(map.get("deploy.resources.cpu").unwrap().as_str(), Some("500m"));
        assert_eq!(map.get("deploy.replicas.sub"), None);
        assert_eq!(map.get(""), None);
    }

    #[test]
    fn test_yaml_preserves_order() {
        let map = ConfigMap::new()
            .with("zeta", 1)
            .with("alpha", 2)
            .with("mid", "x");

        let yaml = map.to_yaml().unwrap();
        let keys: Vec<_> = ConfigMap::from_yaml(&yaml, "t")
            .unwrap()
            .into_inner()
            .into_keys()
            .collect();

        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_empty_document() {
        assert!(ConfigMap::from_yaml("", "pipeline.yaml").unwrap().is_empty());
        assert!(ConfigMap::from_yaml("  \n", "pipeline.yaml").unwrap().is_empty());
    }

    #[test]
    fn test_parse_error_names_source() {
        let err = ConfigMap::from_yaml("key: [unclosed", "pipeline.yaml").unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("pipeline.yaml"));

        let err = ConfigMap::from_yaml("- just\n- a list\n", "application.yaml").unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_invalid_utf8() {
        let err = ConfigMap::from_yaml_slice(&[0xff, 0xfe], "manifest.yaml").unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_json_is_compact() {
        let map = ConfigMap::new().with("a", 1).with("b", vec![true, false]);
        assert_eq!(map.to_json().unwrap(), r#"{"a":1,"b":[true,false]}"#);
    }
}
