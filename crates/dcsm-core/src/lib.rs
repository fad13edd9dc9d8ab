//! DCSM Core - Placeholder Template Engine
//!
//! This crate provides the substitution engine for the DCSM secrets
//! distribution tool. It is pure logic: no I/O, no shared mutable state,
//! nothing async. Callers hand it a template string and a read-only
//! [`Secrets`] mapping and get back a rendered string or an error.
//!
//! ## Placeholder syntax
//!
//! Placeholders are introduced by a marker (default `$DCSM`) and come in
//! three recognized forms plus an escape:
//!
//! | Form    | Example         | Resolves via                       |
//! |---------|-----------------|------------------------------------|
//! | named   | `$DCSM_DB_PASS` | uppercase key `DB_PASS`            |
//! | braced  | `$DCSM{dbPass}` | mixed-case key `dbPass`            |
//! | escaped | `$$DCSM`        | literal `$DCSM`, no lookup         |
//!
//! A marker followed by `_` or `{` that fails to form one of the above is
//! malformed; a marker followed by anything else (`$DCSMVAR`, a space, end
//! of input) is plain text and passes through untouched.
//!
//! ## Usage
//!
//! ```rust
//! use dcsm_core::{Recognizer, Secrets, SecretValue};
//!
//! let recognizer = Recognizer::compile("$DCSM").unwrap();
//! let secrets: Secrets = [("NAME", SecretValue::from("John"))].into_iter().collect();
//!
//! let rendered = recognizer.substitute("Name: $DCSM_NAME", &secrets).unwrap();
//! assert_eq!(rendered, "Name: John");
//! ```

// Substitution engine (recognizer + strict/lenient rendering)
pub mod template;

// Secret values and the read-only mapping
pub mod value;

// Error types
pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::error::{CompileError, RenderError, RenderResult};
    pub use crate::template::{
        Placeholder, PlaceholderKind, Recognizer, RenderMode, DEFAULT_MARKER,
    };
    pub use crate::value::{SecretValue, Secrets};
}

pub use error::{CompileError, RenderError, RenderResult};
pub use template::{Placeholder, PlaceholderKind, Recognizer, RenderMode, DEFAULT_MARKER};
pub use value::{SecretValue, Secrets};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
