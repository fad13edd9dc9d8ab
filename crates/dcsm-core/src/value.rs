//! Secret values and the read-only secrets mapping.

use std::collections::HashMap;

use crate::error::{RenderError, RenderResult};

/// A single decrypted secret.
///
/// The decrypted bundle is a YAML document, so values arrive as arbitrary
/// YAML nodes. Only scalars can be written into a template; the
/// non-scalar variants exist so that conversion can fail with a precise
/// message at substitution time instead of at load time (a structured
/// value that no template references is harmless).
#[derive(Debug, Clone, PartialEq)]
pub enum SecretValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Explicit YAML `null`. Not renderable; see [`SecretValue::render_text`].
    Null,
    /// A YAML mapping. Not renderable.
    Mapping,
    /// A YAML sequence. Not renderable.
    Sequence,
}

impl SecretValue {
    /// Convert this value to the text that replaces a placeholder.
    ///
    /// Scalars use their canonical Rust `Display` form: integers in
    /// decimal, floats via `f64::to_string` (so `3.0` renders as `3`),
    /// booleans as `true`/`false`. `null` and structured values are
    /// [`RenderError::ValueConversion`]: substituting them silently would
    /// plant a defect in the rendered file.
    pub fn render_text(&self, name: &str) -> RenderResult<String> {
        match self {
            Self::String(s) => Ok(s.clone()),
            Self::Integer(i) => Ok(i.to_string()),
            Self::Float(f) => Ok(f.to_string()),
            Self::Bool(b) => Ok(b.to_string()),
            Self::Null | Self::Mapping | Self::Sequence => Err(RenderError::ValueConversion {
                name: name.to_string(),
                found: self.shape_name(),
            }),
        }
    }

    /// Human-readable shape, used in error messages.
    pub fn shape_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Bool(_) => "boolean",
            Self::Null => "null",
            Self::Mapping => "mapping",
            Self::Sequence => "sequence",
        }
    }

    /// `true` for the four renderable scalar shapes.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::String(_) | Self::Integer(_) | Self::Float(_) | Self::Bool(_)
        )
    }
}

impl From<&str> for SecretValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for SecretValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for SecretValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for SecretValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// The decrypted secrets mapping.
///
/// Loaded once per run, held read-only for the duration of template
/// processing, and dropped at process exit. Immutable after construction,
/// so concurrent template rendering needs no locking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Secrets {
    entries: HashMap<String, SecretValue>,
}

impl Secrets {
    /// An empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a secret by exact, case-sensitive key.
    pub fn get(&self, key: &str) -> Option<&SecretValue> {
        self.entries.get(key)
    }

    /// Insert a secret. Intended for loaders and tests; rendering never
    /// mutates the mapping.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SecretValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over keys, in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }
}

impl<K: Into<String>, V: Into<SecretValue>> FromIterator<(K, V)> for Secrets {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
