//! Error types for the template engine.

use thiserror::Error;

/// Errors raised while rendering a single template.
///
/// All variants are local to one `substitute` call; rendering is
/// deterministic, so none of them is worth retrying. A failure means the
/// template or the secrets mapping needs fixing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A named or braced placeholder referenced a key absent from the
    /// mapping. Strict mode only; lenient mode passes the span through.
    #[error("no secret named '{name}'")]
    MissingKey { name: String },

    /// The marker committed to placeholder syntax (`_` or `{`) but the rest
    /// of the span is not a valid identifier. Includes the empty brace pair.
    #[error("malformed placeholder '{span}'")]
    MalformedPlaceholder { span: String },

    /// The key exists but its value is not a renderable scalar.
    ///
    /// Never suppressed, even in lenient mode: a present-but-unconvertible
    /// value is a configuration defect, not an unresolved placeholder.
    #[error("secret '{name}' is a {found} value, expected a scalar")]
    ValueConversion { name: String, found: &'static str },
}

/// Errors raised while compiling a recognizer for a delimiter marker.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The marker does not start with the `$` sigil the escape form doubles.
    #[error("marker '{marker}' must start with '$'")]
    MissingSigil { marker: String },

    /// The marker body contains characters outside `[A-Za-z0-9_]`.
    #[error("marker '{marker}' must be '$' followed by letters, digits, or underscores")]
    InvalidMarker { marker: String },
}

/// Convenience result alias for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_names_the_identifier() {
        let err = RenderError::MissingKey {
            name: "DB_PASS".into(),
        };
        assert_eq!(err.to_string(), "no secret named 'DB_PASS'");
    }

    #[test]
    fn malformed_placeholder_quotes_the_span() {
        let err = RenderError::MalformedPlaceholder {
            span: "$DCSM{}".into(),
        };
        assert!(err.to_string().contains("$DCSM{}"));
    }

    #[test]
    fn value_conversion_reports_the_shape() {
        let err = RenderError::ValueConversion {
            name: "nested".into(),
            found: "mapping",
        };
        assert!(err.to_string().contains("mapping"));
        assert!(err.to_string().contains("nested"));
    }
}
