use crate::error::ConfigError;
use std::{collections::HashMap, fs, path::Path};

const SENSITIVE_PATTERNS: &[&str] = &["password", "passwd", "secret", "token", "credential"];

/// Configuration bundle handed over by the host at instance creation.
///
/// Keys are case-insensitive (`BatchSize`, `batchsize` and `batchSize` all name
/// the same property). A key set to an empty string is treated as absent.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    vars: HashMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut props = Properties::new();
        for (key, value) in pairs {
            props.set(key.as_ref(), value);
        }
        props
    }

    /// Reads a properties file. Both `Key=Value` and the host's native
    /// `Key    Value` layout are accepted; `#` starts a comment line.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        let mut props = Properties::new();
        props.parse_content(&content)?;
        Ok(props)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.vars.insert(key.trim().to_lowercase(), value.into());
    }

    /// Returns the trimmed value for `key`, or `None` when unset or empty.
    /// Sensitive values such as passwords are returned verbatim; quote them in
    /// a file to keep surrounding whitespace.
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_lowercase();
        let value = self.vars.get(&key)?;
        let value = if Self::is_sensitive(&key) {
            value.as_str()
        } else {
            value.trim()
        };
        Some(value).filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Key/value pairs safe to log: sensitive values are masked.
    pub fn redacted(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<_> = self
            .vars
            .iter()
            .map(|(k, v)| {
                let shown = if Self::is_sensitive(k) {
                    "***".to_string()
                } else {
                    v.clone()
                };
                (k.clone(), shown)
            })
            .collect();
        pairs.sort();
        pairs
    }

    fn is_sensitive(key: &str) -> bool {
        SENSITIVE_PATTERNS.iter().any(|p| key.contains(p))
    }

    fn parse_content(&mut self, content: &str) -> Result<(), ConfigError> {
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            // The key ends at the first '=' or whitespace, whichever comes first.
            let (key, value) = match line.find(|c: char| c == '=' || c.is_whitespace()) {
                Some(pos) => {
                    let rest = line[pos..].trim_start();
                    let rest = rest.strip_prefix('=').unwrap_or(rest);
                    (line[..pos].trim(), rest.trim())
                }
                None => (line, ""),
            };

            if key.is_empty() {
                return Err(ConfigError::Malformed(format!(
                    "empty key at line {}",
                    line_num + 1
                )));
            }

            self.set(key, Self::unquote_value(value));
        }

        Ok(())
    }

    fn unquote_value(value: &str) -> String {
        let value = value.trim();

        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                return value[1..value.len() - 1].to_string();
            }
        }

        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_keys_are_case_insensitive() {
        let props = Properties::from_pairs([("BatchSize", "50")]);
        assert_eq!(props.get("batchsize"), Some("50"));
        assert_eq!(props.get("BATCHSIZE"), Some("50"));
    }

    #[test]
    fn test_empty_value_is_absent() {
        let props = Properties::from_pairs([("table", "  ")]);
        assert_eq!(props.get("table"), None);
    }

    #[test]
    fn test_sensitive_values_keep_whitespace() {
        let props = Properties::from_pairs([("Password", " pw "), ("User", " root ")]);
        assert_eq!(props.get("password"), Some(" pw "));
        assert_eq!(props.get("user"), Some("root"));

        let mut props = Properties::new();
        props.parse_content("Password \"  spaced  \"").unwrap();
        assert_eq!(props.get("password"), Some("  spaced  "));
    }

    #[test]
    fn test_parse_both_layouts() {
        let mut props = Properties::new();
        let content = r#"
# output section
Table       events
Address=db.internal:3307
Password="p@ss word"
IgnoreColumns  id created_at
Flag
        "#;

        props.parse_content(content).unwrap();
        assert_eq!(props.get("table"), Some("events"));
        assert_eq!(props.get("address"), Some("db.internal:3307"));
        assert_eq!(props.get("password"), Some("p@ss word"));
        assert_eq!(props.get("ignorecolumns"), Some("id created_at"));
        assert_eq!(props.get("flag"), None);
    }

    #[test]
    fn test_empty_key_is_malformed() {
        let mut props = Properties::new();
        let err = props.parse_content("=value").unwrap_err();
        assert!(matches!(err, ConfigError::Malformed(msg) if msg.contains("line 1")));
    }

    #[test]
    fn test_redacted_masks_password() {
        let props = Properties::from_pairs([("Password", "hunter2"), ("User", "root")]);
        let pairs = props.redacted();
        assert_eq!(
            pairs,
            vec![
                ("password".to_string(), "***".to_string()),
                ("user".to_string(), "root".to_string()),
            ]
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Table logs.events").unwrap();
        writeln!(file, "BatchSize 10").unwrap();

        let props = Properties::load_from_file(file.path()).unwrap();
        assert_eq!(props.get("table"), Some("logs.events"));
        assert_eq!(props.get("batchSize"), Some("10"));
        assert_eq!(props.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Properties::load_from_file(dir.path().join("nope.conf")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
