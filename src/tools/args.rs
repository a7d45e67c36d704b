//! Argument coercion for tool calls
//!
//! `tools/call` arguments arrive as an untyped JSON object. This is the only
//! place that inspects raw values: every tool declares a parameter struct
//! implementing [`FromArguments`], built from [`Arguments`] before its
//! handler runs. Strings are trimmed, numbers are accepted as integers,
//! floats, or numeric strings, and lists must be arrays of strings.

use crate::error::{RamorieError, Result};
use serde_json::{Map, Value};

/// The raw argument bag of one tool call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Map<String, Value>);

/// Coerce a JSON value to an integer
///
/// Accepts integers, finite floats (truncated toward zero), and strings
/// holding either. Everything else is `None`.
///
/// # Examples
///
/// ```
/// use ramorie::tools::args::coerce_integer;
/// use serde_json::json;
///
/// assert_eq!(coerce_integer(&json!(5)), Some(5));
/// assert_eq!(coerce_integer(&json!(5.0)), Some(5));
/// assert_eq!(coerce_integer(&json!(" 12 ")), Some(12));
/// assert_eq!(coerce_integer(&json!("many")), None);
/// ```
pub fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}

impl Arguments {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// The untouched value for `key`
    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Trimmed string value; present-but-empty strings are kept
    ///
    /// Non-string values read as absent.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key) {
            Some(Value::String(s)) => Some(s.trim().to_string()),
            _ => None,
        }
    }

    /// Trimmed, non-empty string value
    pub fn non_empty(&self, key: &str) -> Option<String> {
        self.text(key).filter(|s| !s.is_empty())
    }

    /// Trimmed, non-empty string value or "`key` is required"
    pub fn required(&self, key: &str) -> Result<String> {
        self.non_empty(key)
            .ok_or_else(|| RamorieError::required(key).into())
    }

    /// Two required strings reported together as "`a` and `b` are required"
    pub fn required_pair(&self, a: &str, b: &str) -> Result<(String, String)> {
        match (self.non_empty(a), self.non_empty(b)) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(RamorieError::InvalidArgument(format!("{} and {} are required", a, b)).into()),
        }
    }

    /// Integer through [`coerce_integer`]; absent or unparseable is `None`
    pub fn integer(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(coerce_integer)
    }

    /// Positive integer, else `default`
    pub fn positive_or(&self, key: &str, default: i64) -> i64 {
        self.integer(key).filter(|n| *n > 0).unwrap_or(default)
    }

    /// Optional list of strings
    ///
    /// Absent or `null` is `None`. Elements are trimmed and blank ones
    /// dropped.
    ///
    /// # Errors
    ///
    /// Fails when the value is not an array or holds a non-string element.
    pub fn string_list(&self, key: &str) -> Result<Option<Vec<String>>> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) if s.trim().is_empty() => {}
                        Value::String(s) => out.push(s.trim().to_string()),
                        _ => {
                            return Err(RamorieError::InvalidArgument(format!(
                                "{} must contain only strings",
                                key
                            ))
                            .into())
                        }
                    }
                }
                Ok(Some(out))
            }
            Some(_) => {
                Err(RamorieError::InvalidArgument(format!("{} must be an array", key)).into())
            }
        }
    }

    /// Required, non-empty list of strings
    pub fn required_list(&self, key: &str) -> Result<Vec<String>> {
        let raw_len = match self.0.get(key) {
            Some(Value::Array(items)) => items.len(),
            _ => {
                return Err(
                    RamorieError::InvalidArgument(format!("{} must be an array", key)).into(),
                )
            }
        };
        if raw_len == 0 {
            return Err(RamorieError::InvalidArgument(format!("{} cannot be empty", key)).into());
        }
        let items = self.string_list(key)?.unwrap_or_default();
        if items.is_empty() {
            return Err(
                RamorieError::InvalidArgument(format!("{} holds no usable values", key)).into(),
            );
        }
        Ok(items)
    }

    /// Partial-update map built from the optional string fields `keys`
    ///
    /// Keys listed in `allow_empty` are copied even when blank so callers can
    /// clear them; the rest are copied only when non-empty.
    pub fn updates(&self, keys: &[&str], allow_empty: &[&str]) -> Map<String, Value> {
        let mut updates = Map::new();
        for key in keys {
            let value = if allow_empty.contains(key) {
                self.text(key)
            } else {
                self.non_empty(key)
            };
            if let Some(value) = value {
                updates.insert((*key).to_string(), Value::String(value));
            }
        }
        updates
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Typed parameters for one tool, validated before its handler runs
pub trait FromArguments: Sized {
    /// # Errors
    ///
    /// Returns an argument error describing the first missing or malformed key.
    fn from_arguments(args: &Arguments) -> Result<Self>;
}

/// Parameters of tools that take no arguments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoParams;

impl FromArguments for NoParams {
    fn from_arguments(_args: &Arguments) -> Result<Self> {
        Ok(NoParams)
    }
}

/// Defines a parameter struct holding a single required identifier
macro_rules! id_params {
    ($(#[$meta:meta])* $name:ident, $key:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name(pub String);

        impl FromArguments for $name {
            fn from_arguments(args: &Arguments) -> Result<Self> {
                args.required($key).map($name)
            }
        }
    };
}

id_params!(
    /// `taskId`
    TaskRef,
    "taskId"
);
id_params!(
    /// `projectId`
    ProjectRef,
    "projectId"
);
id_params!(
    /// `memoryId`
    MemoryRef,
    "memoryId"
);
id_params!(
    /// `packId`
    PackRef,
    "packId"
);
id_params!(
    /// `orgId`
    OrgRef,
    "orgId"
);
id_params!(
    /// `decisionId`
    DecisionRef,
    "decisionId"
);
