//! Launch argument overrides from the command line and YAML files

use indexmap::IndexMap;
use std::path::Path;

/// Ordered argument overrides; later assignments win
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentOverrides {
    values: IndexMap<String, String>,
}

impl ArgumentOverrides {
    /// Create an empty override set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an override (builder style)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Add or replace an override
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Apply every override of `other` on top of this set
    pub fn merge(&mut self, other: ArgumentOverrides) {
        self.values.extend(other.values);
    }

    /// Override for `name`, if any
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Overrides in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Load overrides from a flat YAML mapping
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, OverridesError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| OverridesError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse overrides from a YAML string.
    ///
    /// Scalars are kept as written, so `1.10` stays `1.10`.
    pub fn from_yaml(content: &str) -> Result<Self, OverridesError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let values: IndexMap<String, String> = serde_yaml::from_str(content)?;
        Ok(Self { values })
    }
}

impl FromIterator<(String, String)> for ArgumentOverrides {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Parse an assignment in format "key:=value"
pub fn parse_assignment(s: &str) -> Result<(String, String), OverridesError> {
    match s.split_once(":=") {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(OverridesError::InvalidFormat(s.to_string())),
    }
}

/// Errors that can occur when reading overrides
#[derive(Debug, thiserror::Error)]
pub enum OverridesError {
    #[error("Failed to read overrides file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse overrides file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid argument format '{0}'. Expected 'key:=value'")]
    InvalidFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_assignment() {
        let result = parse_assignment("robot_model:=hh020").unwrap();
        assert_eq!(result, ("robot_model".to_string(), "hh020".to_string()));
    }

    #[test]
    fn test_parse_assignment_keeps_extra_separators() {
        let result = parse_assignment("description_file:=a:=b.xacro").unwrap();
        assert_eq!(result.1, "a:=b.xacro");
    }

    #[test]
    fn test_parse_assignment_empty_value() {
        let result = parse_assignment("description_file:=").unwrap();
        assert_eq!(result, ("description_file".to_string(), String::new()));
    }

    #[test]
    fn test_parse_assignment_invalid() {
        assert!(parse_assignment("robot_model=hh020").is_err());
        assert!(parse_assignment(":=hh020").is_err());
    }

    #[test]
    fn test_from_yaml_stringifies_values() {
        let yaml = r#"
robot_model: hdr50_22
description_file: custom.urdf.xacro
retries: 3
verbose: true
"#;
        let overrides = ArgumentOverrides::from_yaml(yaml).unwrap();
        assert_eq!(overrides.get("robot_model"), Some("hdr50_22"));
        assert_eq!(overrides.get("retries"), Some("3"));
        assert_eq!(overrides.get("verbose"), Some("true"));
        let names: Vec<&str> = overrides.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["robot_model", "description_file", "retries", "verbose"]);
    }

    #[test]
    fn test_from_yaml_keeps_numeric_looking_text() {
        let yaml = "description_file: 1.10\ndescription_package: 0x1F\n";
        let overrides = ArgumentOverrides::from_yaml(yaml).unwrap();
        assert_eq!(overrides.get("description_file"), Some("1.10"));
        assert_eq!(overrides.get("description_package"), Some("0x1F"));
    }

    #[test]
    fn test_from_yaml_empty() {
        assert!(ArgumentOverrides::from_yaml("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_from_yaml_rejects_nested_values() {
        let result = ArgumentOverrides::from_yaml("robot_model:\n  nested: 1\n");
        assert!(matches!(result, Err(OverridesError::Parse(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "robot_model: hh020").unwrap();
        let overrides = ArgumentOverrides::from_file(file.path()).unwrap();
        assert_eq!(overrides.get("robot_model"), Some("hh020"));
    }

    #[test]
    fn test_from_missing_file() {
        let result = ArgumentOverrides::from_file("/nonexistent/overrides.yaml");
        assert!(matches!(result, Err(OverridesError::Io { .. })));
    }

    #[test]
    fn test_merge_later_wins() {
        let mut base = ArgumentOverrides::new()
            .with("robot_model", "hdf7_9")
            .with("description_package", "my_description");
        base.merge(ArgumentOverrides::new().with("robot_model", "hh020"));
        assert_eq!(base.get("robot_model"), Some("hh020"));
        assert_eq!(base.get("description_package"), Some("my_description"));
    }
}
