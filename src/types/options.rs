use std::ops::Deref;

use serde_json::Value;

use crate::result::{config_err, Result};

/// Opaque list of arguments forwarded verbatim to an external program
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options(Vec<String>);

impl Options {
    /// Parse the options from their JSON representation.
    ///
    /// Accepted shapes:
    /// - blank text: no option
    /// - an array: every element is one argument
    /// - a string: split on whitespace
    /// - an object: `{"-f": "bestaudio", "--no-playlist": null}` gives
    ///   `-f bestaudio --no-playlist`. `true` keeps the bare key, `false` drops it,
    ///   an array repeats the key for every element
    pub fn from_json(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }

        let json: Value = serde_json::from_str(text)
            .map_err(|err| config_err(format!("Options are not valid JSON: {err}")))?;

        let mut args = Vec::new();
        match json {
            Value::Array(values) => {
                for value in values {
                    args.push(scalar_to_arg(&value)?);
                }
            }
            Value::String(s) => args.extend(s.split_whitespace().map(String::from)),
            Value::Object(map) => {
                for (key, value) in map {
                    match value {
                        Value::Null | Value::Bool(true) => args.push(key),
                        Value::Bool(false) => {}
                        Value::Array(values) => {
                            for value in values {
                                args.push(key.clone());
                                args.push(scalar_to_arg(&value)?);
                            }
                        }
                        Value::Object(_) => {
                            return Err(config_err(format!(
                                "Value of option '{key}' cannot be an object"
                            )))
                        }
                        value => {
                            args.push(key);
                            args.push(scalar_to_arg(&value)?);
                        }
                    }
                }
            }
            _ => {
                return Err(config_err(
                    "Options must be a JSON array, string or object",
                ))
            }
        }

        Ok(Self(args))
    }
}

fn scalar_to_arg(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(config_err(format!("Option value {value} is not a scalar"))),
    }
}

impl Deref for Options {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
