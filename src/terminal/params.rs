//! Positional parameter binding and type coercion

use crate::core::error::{Result, TerminalError};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Declared type of a command parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
}

impl ParamType {
    pub fn label(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
        }
    }
}

/// A typed argument value after coercion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::String(s) => f.write_str(s),
            ParamValue::Number(n) => write!(f, "{}", n),
            ParamValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Declaration of one positional parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub required: bool,
    pub param_type: ParamType,
    /// Raw default text, coerced like a supplied token
    pub default: Option<String>,
}

impl ParamSpec {
    pub fn required(name: &str, param_type: ParamType) -> Self {
        Self {
            name: name.to_string(),
            required: true,
            param_type,
            default: None,
        }
    }

    pub fn optional(name: &str, param_type: ParamType) -> Self {
        Self {
            name: name.to_string(),
            required: false,
            param_type,
            default: None,
        }
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }

    /// Signature fragment used in help text
    pub fn signature(&self) -> String {
        match (&self.default, self.required) {
            (Some(d), _) => format!("[{}:{}={}]", self.name, self.param_type.label(), d),
            (None, true) => format!("<{}:{}>", self.name, self.param_type.label()),
            (None, false) => format!("[{}:{}]", self.name, self.param_type.label()),
        }
    }
}

/// Arguments bound to a command invocation
///
/// Optional parameters with no token and no default are absent, never null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArgs {
    values: AHashMap<String, ParamValue>,
}

impl BoundArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: ParamValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ParamValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Bind positional tokens onto declared parameters
///
/// The i-th token binds to the i-th spec. Once tokens run out, a spec's
/// default is used; a required spec without one fails the whole binding and
/// an optional one is left out. Extra tokens beyond the declared specs are
/// ignored.
pub fn bind(tokens: &[String], specs: &[ParamSpec]) -> Result<BoundArgs> {
    let mut args = BoundArgs::new();
    let mut remaining = tokens.iter();

    for spec in specs {
        let raw = match (remaining.next(), &spec.default) {
            (Some(token), _) => token.as_str(),
            (None, Some(default)) => default.as_str(),
            (None, None) if spec.required => {
                return Err(TerminalError::MissingParameter(spec.name.clone()));
            }
            (None, None) => continue,
        };

        args.insert(&spec.name, coerce(raw, spec)?);
    }

    Ok(args)
}

/// Coerce raw text into the spec's declared type
///
/// Booleans are lenient: only the exact text "true" is true and everything
/// else is false, with no error path. Existing command lines rely on this.
fn coerce(raw: &str, spec: &ParamSpec) -> Result<ParamValue> {
    match spec.param_type {
        ParamType::String => Ok(ParamValue::String(raw.to_string())),
        ParamType::Number => parse_number(raw)
            .map(ParamValue::Number)
            .ok_or_else(|| TerminalError::InvalidType {
                name: spec.name.clone(),
                expected: "number",
            }),
        ParamType::Boolean => Ok(ParamValue::Boolean(raw == "true")),
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
}
