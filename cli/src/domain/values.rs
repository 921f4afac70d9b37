//! Declarative auto-repairs for the release values document.
//!
//! Operates on an in-memory `serde_yaml::Value`; loading and saving the
//! document is the caller's job. Every repair is idempotent: a document
//! that was repaired once yields no repairs on the next pass.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use serde_yaml::{Mapping, Value};

/// Path to the webserver's service exposure mode.
pub const SERVICE_TYPE_PATH: &[&str] = &["webserver", "service", "type"];

/// Exposure mode enforced on the webserver service. Local access goes
/// through port-forwards, never through a node port or load balancer.
pub const INTERNAL_SERVICE_TYPE: &str = "ClusterIP";

/// Top-level key holding the symmetric encryption key.
pub const FERNET_KEY: &str = "fernetKey";

/// A change applied to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repair {
    /// The service exposure field was set to [`INTERNAL_SERVICE_TYPE`].
    ServiceTypeForced { previous: Option<String> },
    /// The configured key was invalid and a fresh one was injected.
    FernetKeyRegenerated,
}

impl Repair {
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::ServiceTypeForced { previous: Some(p) } => {
                format!("webserver.service.type {p} → {INTERNAL_SERVICE_TYPE}")
            }
            Self::ServiceTypeForced { previous: None } => {
                format!("webserver.service.type set to {INTERNAL_SERVICE_TYPE}")
            }
            Self::FernetKeyRegenerated => "fernetKey replaced with a valid generated key".into(),
        }
    }
}

/// A valid key is URL-safe base64 that decodes to exactly 32 bytes.
#[must_use]
pub fn is_valid_fernet_key(key: &str) -> bool {
    URL_SAFE.decode(key).is_ok_and(|bytes| bytes.len() == 32)
}

/// Generate a fresh key from 32 random bytes.
#[must_use]
pub fn generate_fernet_key() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE.encode(bytes)
}

/// Apply every repair to `doc`, returning what changed.
///
/// `new_key` is only called when the configured key is invalid. An absent
/// or empty key is left alone so the chart generates its own.
pub fn repair_values(doc: &mut Value, new_key: impl FnOnce() -> String) -> Vec<Repair> {
    let mut repairs = Vec::new();

    let current = lookup(doc, SERVICE_TYPE_PATH).and_then(Value::as_str);
    if current != Some(INTERNAL_SERVICE_TYPE) {
        let previous = lookup(doc, SERVICE_TYPE_PATH).map(describe_scalar);
        set_path(doc, SERVICE_TYPE_PATH, Value::from(INTERNAL_SERVICE_TYPE));
        repairs.push(Repair::ServiceTypeForced { previous });
    }

    let key_invalid = match lookup(doc, &[FERNET_KEY]) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) if s.is_empty() => false,
        Some(Value::String(s)) => !is_valid_fernet_key(s),
        Some(_) => true,
    };
    if key_invalid {
        set_path(doc, &[FERNET_KEY], Value::from(new_key()));
        repairs.push(Repair::FernetKeyRegenerated);
    }

    repairs
}

fn lookup<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(doc, |cur, key| cur.get(*key))
}

fn set_path(doc: &mut Value, path: &[&str], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut cur = doc;
    for key in parents {
        cur = ensure_mapping(cur)
            .entry(Value::from(*key))
            .or_insert(Value::Mapping(Mapping::new()));
    }
    ensure_mapping(cur).insert(Value::from(*last), value);
}

fn ensure_mapping(value: &mut Value) -> &mut Mapping {
    if !value.is_mapping() {
        *value = Value::Mapping(Mapping::new());
    }
    match value {
        Value::Mapping(map) => map,
        _ => unreachable!("value was just replaced with a mapping"),
    }
}

fn describe_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}
