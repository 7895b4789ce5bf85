//! Variant descriptors

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::VariantError;

fn env_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"))
}

/// A single environment override of a variant
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnvOverride {
    key: String,
    value: String,
}

impl EnvOverride {
    /// Create an override, rejecting empty or unusable keys and empty values
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Result<Self, VariantError> {
        Self::checked(0, key.into(), value.into())
    }

    /// Parse a `KEY=VALUE` string
    pub fn parse(s: &str) -> Result<Self, VariantError> {
        Self::parse_at(0, s)
    }

    fn parse_at(position: usize, s: &str) -> Result<Self, VariantError> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| VariantError::Malformed(s.to_string()))?;
        Self::checked(position, key.trim().to_string(), value.trim().to_string())
    }

    fn checked(position: usize, key: String, value: String) -> Result<Self, VariantError> {
        if key.is_empty() {
            return Err(VariantError::EmptyKey { position });
        }
        if !env_key_pattern().is_match(&key) {
            return Err(VariantError::InvalidKey(key));
        }
        if value.is_empty() {
            return Err(VariantError::EmptyValue { key });
        }
        Ok(Self { key, value })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for EnvOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// An ordered, validated set of environment overrides selecting one target.
///
/// Order matters for naming: archive names join the override values in the
/// order they were declared. Serialized as a list of `KEY=VALUE` strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct VariantDescriptor {
    overrides: Vec<EnvOverride>,
}

impl VariantDescriptor {
    /// Build a descriptor from key/value pairs
    pub fn new<I, K, V>(pairs: I) -> Result<Self, VariantError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let overrides = pairs
            .into_iter()
            .enumerate()
            .map(|(position, (k, v))| EnvOverride::checked(position, k.into(), v.into()))
            .collect::<Result<Vec<_>, _>>()?;

        if overrides.is_empty() {
            return Err(VariantError::EmptyDescriptor);
        }

        Ok(Self { overrides })
    }

    /// Build a descriptor from `KEY=VALUE` strings
    pub fn parse<S: AsRef<str>>(items: &[S]) -> Result<Self, VariantError> {
        let overrides = items
            .iter()
            .enumerate()
            .map(|(position, s)| EnvOverride::parse_at(position, s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        if overrides.is_empty() {
            return Err(VariantError::EmptyDescriptor);
        }

        Ok(Self { overrides })
    }

    /// Descriptor from a compile-time table. The built-in table is covered by tests.
    pub(crate) fn from_static(pairs: &[(&'static str, &'static str)]) -> Self {
        Self {
            overrides: pairs
                .iter()
                .map(|(k, v)| EnvOverride {
                    key: (*k).to_string(),
                    value: (*v).to_string(),
                })
                .collect(),
        }
    }

    /// Overrides in declaration order
    pub fn overrides(&self) -> &[EnvOverride] {
        &self.overrides
    }

    /// Effective value for a key; the last declaration wins
    pub fn get(&self, key: &str) -> Option<&str> {
        self.overrides
            .iter()
            .rev()
            .find(|o| o.key == key)
            .map(|o| o.value.as_str())
    }

    /// Whether the descriptor overrides the given key
    pub fn contains_key(&self, key: &str) -> bool {
        self.overrides.iter().any(|o| o.key == key)
    }

    /// Override values in declaration order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.overrides.iter().map(|o| o.value.as_str())
    }

    /// Short human-readable label, e.g. `linux/amd64/v3`
    pub fn label(&self) -> String {
        self.values().collect::<Vec<_>>().join("/")
    }
}

impl fmt::Display for VariantDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.overrides.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(" "))
    }
}

impl TryFrom<Vec<String>> for VariantDescriptor {
    type Error = VariantError;

    fn try_from(items: Vec<String>) -> Result<Self, Self::Error> {
        Self::parse(&items)
    }
}

impl From<VariantDescriptor> for Vec<String> {
    fn from(descriptor: VariantDescriptor) -> Self {
        descriptor
            .overrides
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}
