//! Placeholder recognition and substitution.
//!
//! A [`Recognizer`] is compiled once per delimiter marker and then applied
//! to any number of templates. Recognition is a single left-to-right regex
//! scan with four alternatives tried in fixed priority order:
//!
//! 1. **escaped**: the marker's `$` sigil doubled (`$$DCSM`), emitted as
//!    one literal marker with no lookup;
//! 2. **named**: `$DCSM_` followed by `[A-Z][A-Z0-9_]*`;
//! 3. **braced**: `$DCSM{` followed by `[a-zA-Z][a-zA-Z0-9_]*` and `}`;
//! 4. **invalid**: the marker committed to placeholder syntax (`_` or `{`)
//!    without forming a valid named/braced placeholder.
//!
//! Priority order matters: the escape must be tried before the other forms
//! so that `$$DCSM_VAR` reads as an escaped marker plus literal `_VAR`, not
//! as a stray `$` in front of a named placeholder. The first alternative
//! that matches wins; there is no backtracking.
//!
//! Text between matches is copied through unchanged, including a marker
//! followed by anything other than `_` or `{`, such as `$DCSMVAR`.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::error::{CompileError, RenderError, RenderResult};
use crate::value::Secrets;

/// The delimiter marker used by the stock `dcsm` toolchain.
pub const DEFAULT_MARKER: &str = "$DCSM";

static DEFAULT_RECOGNIZER: Lazy<Recognizer> = Lazy::new(|| {
    Recognizer::compile(DEFAULT_MARKER).expect("the default marker is a valid marker")
});

/// Which placeholder form a recognized span belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    /// Doubled-sigil escape; renders as one literal marker.
    Escaped,
    /// `MARKER_UPPERCASE` form.
    Named,
    /// `MARKER{identifier}` form.
    Braced,
    /// Committed to placeholder syntax but malformed.
    Invalid,
}

/// One recognized span within a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'t> {
    pub kind: PlaceholderKind,
    /// The full matched text, e.g. `$DCSM{var}`.
    pub span: &'t str,
    /// Byte offset of the span within the template.
    pub start: usize,
    /// The captured identifier for named/braced forms; `None` otherwise.
    pub name: Option<&'t str>,
}

/// Whether unresolved placeholders abort rendering or pass through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Missing keys and malformed placeholders are errors.
    #[default]
    Strict,
    /// Missing keys and malformed placeholders are left verbatim. Used for
    /// dry-run/validation paths that must not fail on unknown placeholders.
    Lenient,
}

/// Compiled pattern recognizer for one delimiter marker.
#[derive(Debug, Clone)]
pub struct Recognizer {
    marker: String,
    pattern: Regex,
}

impl Recognizer {
    /// Compile a recognizer for the given marker.
    ///
    /// The marker must be `$` followed by at least one character from
    /// `[A-Za-z0-9_]`. The leading sigil is what the escape form doubles,
    /// so a sigil-less marker has no escape syntax and is rejected.
    pub fn compile(marker: &str) -> Result<Self, CompileError> {
        let Some(body) = marker.strip_prefix('$') else {
            return Err(CompileError::MissingSigil {
                marker: marker.to_string(),
            });
        };
        if body.is_empty() || !body.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(CompileError::InvalidMarker {
                marker: marker.to_string(),
            });
        }

        // Alternation order encodes the match priority. `regex` uses
        // leftmost-first semantics, so at any position the earliest
        // alternative that matches is the one that wins.
        let m = regex::escape(marker);
        let source = format!(
            r"(?P<escaped>\$(?:{m}))|(?:{m})_(?P<named>[A-Z][A-Z0-9_]*)|(?:{m})\{{(?P<braced>[a-zA-Z][a-zA-Z0-9_]*)\}}|(?P<invalid>(?:{m})(?:_[A-Za-z0-9_]*|\{{[^}}]*\}}?))"
        );
        let pattern = Regex::new(&source).map_err(|_| CompileError::InvalidMarker {
            marker: marker.to_string(),
        })?;

        debug!(marker, "compiled placeholder recognizer");
        Ok(Self {
            marker: marker.to_string(),
            pattern,
        })
    }

    /// The shared recognizer for [`DEFAULT_MARKER`].
    pub fn default_marker() -> &'static Recognizer {
        &DEFAULT_RECOGNIZER
    }

    /// The marker this recognizer was compiled for.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// List every recognized span in order of appearance.
    ///
    /// Spans never overlap; text between them is not represented. This is
    /// the scan that [`Recognizer::render`] consumes internally, exposed
    /// for diagnostics and tests.
    pub fn scan<'t>(&self, template: &'t str) -> Vec<Placeholder<'t>> {
        let mut found = Vec::new();
        for caps in self.pattern.captures_iter(template) {
            let Some(overall) = caps.get(0) else { continue };
            let (kind, name) = if caps.name("escaped").is_some() {
                (PlaceholderKind::Escaped, None)
            } else if let Some(m) = caps.name("named") {
                (PlaceholderKind::Named, Some(m.as_str()))
            } else if let Some(m) = caps.name("braced") {
                (PlaceholderKind::Braced, Some(m.as_str()))
            } else {
                (PlaceholderKind::Invalid, None)
            };
            found.push(Placeholder {
                kind,
                span: overall.as_str(),
                start: overall.start(),
                name,
            });
        }
        found
    }

    /// Strict substitution: fails on missing keys and malformed placeholders.
    pub fn substitute(&self, template: &str, secrets: &Secrets) -> RenderResult<String> {
        self.render(template, secrets, RenderMode::Strict)
    }

    /// Lenient substitution: unresolved placeholders are left verbatim.
    ///
    /// Escapes are still unescaped, and a key that resolves to a non-scalar
    /// value still fails; only `MissingKey` and `MalformedPlaceholder` are
    /// downgraded to pass-through.
    pub fn substitute_lenient(&self, template: &str, secrets: &Secrets) -> RenderResult<String> {
        self.render(template, secrets, RenderMode::Lenient)
    }

    /// Render a template in the given mode.
    ///
    /// Single pass, no partial output: the returned string is complete or
    /// the call fails. Callers must not persist anything on error.
    pub fn render(
        &self,
        template: &str,
        secrets: &Secrets,
        mode: RenderMode,
    ) -> RenderResult<String> {
        trace!(len = template.len(), ?mode, "rendering template");

        let mut out = String::with_capacity(template.len());
        let mut cursor = 0;

        for caps in self.pattern.captures_iter(template) {
            let Some(overall) = caps.get(0) else { continue };
            out.push_str(&template[cursor..overall.start()]);
            cursor = overall.end();

            if caps.name("escaped").is_some() {
                out.push_str(&self.marker);
            } else if let Some(name) = caps.name("named").or_else(|| caps.name("braced")) {
                match secrets.get(name.as_str()) {
                    Some(value) => out.push_str(&value.render_text(name.as_str())?),
                    None if mode == RenderMode::Strict => {
                        return Err(RenderError::MissingKey {
                            name: name.as_str().to_string(),
                        });
                    }
                    None => out.push_str(overall.as_str()),
                }
            } else if mode == RenderMode::Strict {
                return Err(RenderError::MalformedPlaceholder {
                    span: overall.as_str().to_string(),
                });
            } else {
                out.push_str(overall.as_str());
            }
        }

        out.push_str(&template[cursor..]);
        Ok(out)
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SecretValue;

    fn recognizer() -> &'static Recognizer {
        Recognizer::default_marker()
    }

    fn secrets(pairs: &[(&str, &str)]) -> Secrets {
        pairs.iter().map(|&(k, v)| (k, v)).collect()
    }

    // ── recognized forms ──────────────────────────────────────────────────

    #[test]
    fn braced_pattern() {
        let out = recognizer()
            .substitute("Value: $DCSM{var}", &secrets(&[("var", "123")]))
            .unwrap();
        assert_eq!(out, "Value: 123");
    }

    #[test]
    fn named_pattern() {
        let out = recognizer()
            .substitute("Name: $DCSM_NAME", &secrets(&[("NAME", "John")]))
            .unwrap();
        assert_eq!(out, "Name: John");
    }

    #[test]
    fn escaped_braced() {
        let out = recognizer()
            .substitute("Escaped: $$DCSM{VAR}", &Secrets::new())
            .unwrap();
        assert_eq!(out, "Escaped: $DCSM{VAR}");
    }

    #[test]
    fn escaped_named() {
        let out = recognizer()
            .substitute("Escaped: $$DCSM_VAR", &Secrets::new())
            .unwrap();
        assert_eq!(out, "Escaped: $DCSM_VAR");
    }

    #[test]
    fn bare_escape_renders_one_marker() {
        let out = recognizer().substitute("$$DCSM", &Secrets::new()).unwrap();
        assert_eq!(out, "$DCSM");
    }

    #[test]
    fn named_identifier_stops_at_first_foreign_char() {
        // The lowercase tail is outside the named alphabet, so the
        // identifier is HOST and "name" is literal text.
        let out = recognizer()
            .substitute("$DCSM_HOSTname", &secrets(&[("HOST", "db01")]))
            .unwrap();
        assert_eq!(out, "db01name");
    }

    #[test]
    fn braced_identifier_may_be_mixed_case() {
        let out = recognizer()
            .substitute("$DCSM{dbPass}", &secrets(&[("dbPass", "s3cret")]))
            .unwrap();
        assert_eq!(out, "s3cret");
    }

    #[test]
    fn multiple_placeholders_in_one_template() {
        let mapping = secrets(&[("USER", "app"), ("pass", "pw")]);
        let out = recognizer()
            .substitute("u=$DCSM_USER p=$DCSM{pass} u2=$DCSM_USER", &mapping)
            .unwrap();
        assert_eq!(out, "u=app p=pw u2=app");
    }

    // ── pass-through text ─────────────────────────────────────────────────

    #[test]
    fn not_a_pattern_passes_through() {
        let out = recognizer()
            .substitute("Not a pattern: $DCSMVAR", &Secrets::new())
            .unwrap();
        assert_eq!(out, "Not a pattern: $DCSMVAR");
    }

    #[test]
    fn bare_marker_passes_through() {
        // Neither `_` nor `{` follows, so the marker never commits to
        // placeholder syntax.
        assert_eq!(
            recognizer().substitute("$DCSM", &Secrets::new()).unwrap(),
            "$DCSM"
        );
        assert_eq!(
            recognizer()
                .substitute("end: $DCSM done", &Secrets::new())
                .unwrap(),
            "end: $DCSM done"
        );
    }

    #[test]
    fn template_without_placeholders_is_unchanged_in_both_modes() {
        let text = "plain text, even with $ and {braces}";
        let mapping = secrets(&[("x", "y")]);
        assert_eq!(recognizer().substitute(text, &mapping).unwrap(), text);
        assert_eq!(
            recognizer().substitute_lenient(text, &mapping).unwrap(),
            text
        );
    }

    // ── strict-mode failures ──────────────────────────────────────────────

    #[test]
    fn empty_braces_are_malformed() {
        let err = recognizer()
            .substitute("Invalid: $DCSM{}", &Secrets::new())
            .unwrap_err();
        assert_eq!(
            err,
            RenderError::MalformedPlaceholder {
                span: "$DCSM{}".into()
            }
        );
    }

    #[test]
    fn lowercase_named_is_malformed() {
        let err = recognizer()
            .substitute("Invalid: $DCSM_name", &Secrets::new())
            .unwrap_err();
        assert_eq!(
            err,
            RenderError::MalformedPlaceholder {
                span: "$DCSM_name".into()
            }
        );
    }

    #[test]
    fn trailing_underscore_alone_is_malformed() {
        let err = recognizer()
            .substitute("$DCSM_", &Secrets::new())
            .unwrap_err();
        assert!(matches!(err, RenderError::MalformedPlaceholder { .. }));
    }

    #[test]
    fn unclosed_brace_is_malformed() {
        let err = recognizer()
            .substitute("$DCSM{oops", &Secrets::new())
            .unwrap_err();
        assert!(matches!(err, RenderError::MalformedPlaceholder { .. }));
    }

    #[test]
    fn brace_starting_with_digit_is_malformed() {
        let err = recognizer()
            .substitute("$DCSM{1bad}", &Secrets::new())
            .unwrap_err();
        assert_eq!(
            err,
            RenderError::MalformedPlaceholder {
                span: "$DCSM{1bad}".into()
            }
        );
    }

    #[test]
    fn missing_key_identifies_the_name() {
        let err = recognizer()
            .substitute("$DCSM_NOPE", &Secrets::new())
            .unwrap_err();
        assert_eq!(err, RenderError::MissingKey { name: "NOPE".into() });
    }

    // ── lenient mode ──────────────────────────────────────────────────────

    #[test]
    fn lenient_leaves_missing_key_verbatim() {
        let out = recognizer()
            .substitute_lenient("$DCSM_NOPE", &Secrets::new())
            .unwrap();
        assert_eq!(out, "$DCSM_NOPE");
    }

    #[test]
    fn lenient_leaves_malformed_verbatim() {
        let mapping = Secrets::new();
        assert_eq!(
            recognizer()
                .substitute_lenient("Invalid: $DCSM{}", &mapping)
                .unwrap(),
            "Invalid: $DCSM{}"
        );
        assert_eq!(
            recognizer()
                .substitute_lenient("Invalid: $DCSM_name", &mapping)
                .unwrap(),
            "Invalid: $DCSM_name"
        );
    }

    #[test]
    fn lenient_still_unescapes() {
        let out = recognizer()
            .substitute_lenient("$$DCSM_VAR", &Secrets::new())
            .unwrap();
        assert_eq!(out, "$DCSM_VAR");
    }

    #[test]
    fn lenient_still_resolves_present_keys() {
        let out = recognizer()
            .substitute_lenient("$DCSM_A and $DCSM_B", &secrets(&[("A", "1")]))
            .unwrap();
        assert_eq!(out, "1 and $DCSM_B");
    }

    #[test]
    fn value_conversion_fails_even_in_lenient_mode() {
        let mut mapping = Secrets::new();
        mapping.insert("NESTED", SecretValue::Mapping);
        let err = recognizer()
            .substitute_lenient("$DCSM_NESTED", &mapping)
            .unwrap_err();
        assert!(matches!(err, RenderError::ValueConversion { .. }));
    }

    // ── scalar conversion through the engine ──────────────────────────────

    #[test]
    fn non_string_scalars_render() {
        let mut mapping = Secrets::new();
        mapping.insert("PORT", 5432i64);
        mapping.insert("DEBUG", false);
        mapping.insert("RATIO", 0.25f64);
        let out = recognizer()
            .substitute("$DCSM_PORT $DCSM_DEBUG $DCSM_RATIO", &mapping)
            .unwrap();
        assert_eq!(out, "5432 false 0.25");
    }

    // ── scan ──────────────────────────────────────────────────────────────

    #[test]
    fn scan_reports_kinds_in_order() {
        let spans = recognizer().scan("$$DCSM $DCSM_A $DCSM{b} $DCSM{} text");
        let kinds: Vec<_> = spans.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PlaceholderKind::Escaped,
                PlaceholderKind::Named,
                PlaceholderKind::Braced,
                PlaceholderKind::Invalid,
            ]
        );
        assert_eq!(spans[0].start, 0);
        assert_eq!(spans[1].name, Some("A"));
        assert_eq!(spans[2].name, Some("b"));
        assert_eq!(spans[3].span, "$DCSM{}");
    }

    #[test]
    fn scan_ignores_plain_text() {
        assert!(recognizer().scan("no placeholders here").is_empty());
        assert!(recognizer().scan("$DCSMVAR").is_empty());
    }

    // ── compile ───────────────────────────────────────────────────────────

    #[test]
    fn compile_accepts_custom_marker() {
        let custom = Recognizer::compile("$SECRET").unwrap();
        assert_eq!(custom.marker(), "$SECRET");
        let out = custom
            .substitute("$SECRET_KEY", &secrets(&[("KEY", "v")]))
            .unwrap();
        assert_eq!(out, "v");
        // The default marker means nothing to a custom recognizer.
        assert_eq!(
            custom.substitute("$DCSM_KEY", &Secrets::new()).unwrap(),
            "$DCSM_KEY"
        );
    }

    #[test]
    fn compile_rejects_marker_without_sigil() {
        assert_eq!(
            Recognizer::compile("DCSM").unwrap_err(),
            CompileError::MissingSigil {
                marker: "DCSM".into()
            }
        );
    }

    #[test]
    fn compile_rejects_empty_or_odd_markers() {
        assert!(matches!(
            Recognizer::compile("$").unwrap_err(),
            CompileError::InvalidMarker { .. }
        ));
        assert!(matches!(
            Recognizer::compile("$DC SM").unwrap_err(),
            CompileError::InvalidMarker { .. }
        ));
    }

    #[test]
    fn escape_takes_priority_over_invalid() {
        // `$$DCSM{}` must parse as escape + literal braces, not as a `$`
        // followed by a malformed placeholder.
        let out = recognizer()
            .substitute("$$DCSM{}", &Secrets::new())
            .unwrap();
        assert_eq!(out, "$DCSM{}");
    }
}
