//! Secrets loading: decrypt the bundle, parse it as YAML.
//!
//! The decrypted document must be a mapping with string keys. Values may
//! be any YAML node; non-scalars only become errors if a template
//! actually references them (see `dcsm_core::SecretValue::render_text`).

use std::path::Path;

use tracing::{debug, instrument};

use dcsm_core::{SecretValue, Secrets};

use crate::age::Cipher;
use crate::error::{AdapterError, Result};

/// Decrypt `bundle` with `keyfile` and parse the plaintext into [`Secrets`].
#[instrument(skip_all, fields(bundle = %bundle.display()))]
pub fn load_secrets(cipher: &dyn Cipher, keyfile: &Path, bundle: &Path) -> Result<Secrets> {
    let plaintext = cipher.decrypt_to_memory(keyfile, bundle)?;
    let secrets = parse_secrets(&plaintext)?;
    debug!(count = secrets.len(), "secrets loaded");
    Ok(secrets)
}

/// Parse decrypted plaintext into the secrets mapping.
///
/// Fails if the document is not a mapping or any top-level key is not a
/// string. Split out from [`load_secrets`] so it can be tested without a
/// cipher.
pub fn parse_secrets(plaintext: &[u8]) -> Result<Secrets> {
    let doc: serde_yaml::Value = serde_yaml::from_slice(plaintext)?;

    let serde_yaml::Value::Mapping(mapping) = doc else {
        return Err(AdapterError::SecretsNotMapping {
            found: yaml_shape(&doc),
        });
    };

    let mut secrets = Secrets::new();
    for (key, value) in mapping {
        let serde_yaml::Value::String(key) = key else {
            return Err(AdapterError::NonStringKey {
                key: describe_key(&key),
            });
        };
        secrets.insert(key, convert_value(value));
    }

    Ok(secrets)
}

fn convert_value(value: serde_yaml::Value) -> SecretValue {
    match value {
        serde_yaml::Value::Null => SecretValue::Null,
        serde_yaml::Value::Bool(b) => SecretValue::Bool(b),
        serde_yaml::Value::Number(n) => match n.as_i64() {
            Some(i) => SecretValue::Integer(i),
            None => SecretValue::Float(n.as_f64().unwrap_or_default()),
        },
        serde_yaml::Value::String(s) => SecretValue::String(s),
        serde_yaml::Value::Sequence(_) => SecretValue::Sequence,
        serde_yaml::Value::Mapping(_) => SecretValue::Mapping,
        // A tag changes the key's spelling, not the value's shape.
        serde_yaml::Value::Tagged(tagged) => convert_value(tagged.value),
    }
}

fn yaml_shape(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "boolean",
        serde_yaml::Value::Number(_) => "number",
        serde_yaml::Value::String(_) => "string",
        serde_yaml::Value::Sequence(_) => "sequence",
        serde_yaml::Value::Mapping(_) => "mapping",
        serde_yaml::Value::Tagged(_) => "tagged value",
    }
}

fn describe_key(key: &serde_yaml::Value) -> String {
    serde_yaml::to_string(key)
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|_| "<unprintable>".to_string())
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalar_values() {
        let secrets = parse_secrets(
            b"NAME: John\nPORT: 5432\nRATIO: 0.5\nDEBUG: true\nEMPTY: null\n",
        )
        .unwrap();
        assert_eq!(secrets.get("NAME"), Some(&SecretValue::String("John".into())));
        assert_eq!(secrets.get("PORT"), Some(&SecretValue::Integer(5432)));
        assert_eq!(secrets.get("RATIO"), Some(&SecretValue::Float(0.5)));
        assert_eq!(secrets.get("DEBUG"), Some(&SecretValue::Bool(true)));
        assert_eq!(secrets.get("EMPTY"), Some(&SecretValue::Null));
    }

    #[test]
    fn structured_values_load_as_non_scalars() {
        let secrets = parse_secrets(b"nested:\n  a: 1\nlist:\n  - x\n").unwrap();
        assert_eq!(secrets.get("nested"), Some(&SecretValue::Mapping));
        assert_eq!(secrets.get("list"), Some(&SecretValue::Sequence));
    }

    #[test]
    fn non_string_key_fails_the_whole_load() {
        let err = parse_secrets(b"GOOD: 1\n3: bad\n").unwrap_err();
        match err {
            AdapterError::NonStringKey { key } => assert_eq!(key, "3"),
            other => panic!("expected NonStringKey, got {other:?}"),
        }
    }

    #[test]
    fn non_mapping_document_is_rejected() {
        let err = parse_secrets(b"- just\n- a\n- list\n").unwrap_err();
        assert!(matches!(
            err,
            AdapterError::SecretsNotMapping { found: "sequence" }
        ));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = parse_secrets(b"{unterminated").unwrap_err();
        assert!(matches!(err, AdapterError::SecretsParse { .. }));
    }

    #[test]
    fn quoted_numeric_key_is_a_string() {
        let secrets = parse_secrets(b"\"3\": ok\n").unwrap();
        assert_eq!(secrets.get("3"), Some(&SecretValue::String("ok".into())));
    }

    #[test]
    fn load_runs_the_cipher_then_parses() {
        struct StaticCipher;
        impl Cipher for StaticCipher {
            fn decrypt_to_memory(&self, _k: &Path, _i: &Path) -> Result<Vec<u8>> {
                Ok(b"USER: app\nPORT: 8080\n".to_vec())
            }
            fn decrypt_to_file(&self, _k: &Path, _i: &Path, _o: &Path) -> Result<()> {
                unreachable!("load_secrets only decrypts to memory")
            }
            fn encrypt_to_file(&self, _k: &Path, _i: &Path, _o: &Path) -> Result<()> {
                unreachable!("load_secrets never encrypts")
            }
            fn keygen(&self, _o: &Path) -> Result<()> {
                unreachable!("load_secrets never generates keys")
            }
        }

        let secrets =
            load_secrets(&StaticCipher, Path::new("/k"), Path::new("/b.age")).unwrap();
        assert_eq!(secrets.get("USER"), Some(&SecretValue::String("app".into())));
        assert_eq!(secrets.get("PORT"), Some(&SecretValue::Integer(8080)));
    }
}
