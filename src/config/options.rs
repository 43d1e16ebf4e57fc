//! The closed set of recognized top-level configuration options.
//!
//! Each option names the key it handles and an `apply` function that
//! shape-checks the JSON value and stores it on the raw builder. All shape
//! mismatches funnel through the shared [`ConfigError::WrongShape`] path so
//! every option reports the same way.

use super::builder::RawConfig;
use super::ConfigError;
use serde_json::{Map, Value};

/// Default for the `root` option, relative to the config file's directory.
pub(crate) const DEFAULT_ROOT: &str = ".";

/// Default for the `charset` option.
pub(crate) const DEFAULT_CHARSET: &str = "UTF-8";

pub(crate) struct ConfigOption {
    pub name: &'static str,
    pub apply: fn(&mut RawConfig, &Value) -> Result<(), ConfigError>,
}

pub(crate) const OPTIONS: &[ConfigOption] = &[
    ConfigOption {
        name: "root",
        apply: |raw, value| {
            raw.root = Some(expect_string("root", value)?);
            Ok(())
        },
    },
    ConfigOption {
        name: "output-path",
        apply: |raw, value| {
            raw.output_path = Some(expect_string("output-path", value)?);
            Ok(())
        },
    },
    ConfigOption {
        name: "output-wrapper",
        apply: |raw, value| {
            raw.output_wrapper = Some(expect_string_or_array("output-wrapper", value)?);
            Ok(())
        },
    },
    ConfigOption {
        name: "modules",
        apply: |raw, value| {
            raw.modules = Some(expect_object("modules", value)?.clone());
            Ok(())
        },
    },
    ConfigOption {
        name: "charset",
        apply: |raw, value| {
            raw.charset = Some(expect_string("charset", value)?);
            Ok(())
        },
    },
    ConfigOption {
        name: "preprocess",
        apply: |raw, value| {
            raw.preprocess = Some(expect_string("preprocess", value)?);
            Ok(())
        },
    },
];

fn expect_string(option: &'static str, value: &Value) -> Result<String, ConfigError> {
    match value {
        Value::String(text) => Ok(text.clone()),
        other => Err(wrong_shape(option, "a string", other)),
    }
}

/// Accepts a string, or an array of strings concatenated in order. The array
/// form lets long templates be split across lines in the source document.
fn expect_string_or_array(option: &'static str, value: &Value) -> Result<String, ConfigError> {
    const EXPECTED: &str = "a string or an array of strings";

    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Array(items) => {
            let mut joined = String::new();
            for item in items {
                match item {
                    Value::String(part) => joined.push_str(part),
                    other => return Err(wrong_shape(option, EXPECTED, other)),
                }
            }
            Ok(joined)
        }
        other => Err(wrong_shape(option, EXPECTED, other)),
    }
}

fn expect_object<'v>(
    option: &'static str,
    value: &'v Value,
) -> Result<&'v Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(wrong_shape(option, "an object", other)),
    }
}

fn wrong_shape(option: &'static str, expected: &'static str, found: &Value) -> ConfigError {
    ConfigError::WrongShape {
        option,
        expected,
        found: found.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn apply(name: &str, value: Value) -> Result<RawConfig, ConfigError> {
        let option = OPTIONS
            .iter()
            .find(|option| option.name == name)
            .expect("option exists");
        let mut raw = RawConfig::default();
        (option.apply)(&mut raw, &value)?;
        Ok(raw)
    }

    #[test]
    fn string_options_reject_other_shapes() {
        for name in ["root", "output-path", "charset", "preprocess"] {
            let err = apply(name, json!(42)).unwrap_err();
            match err {
                ConfigError::WrongShape {
                    option,
                    expected,
                    found,
                } => {
                    assert_eq!(option, name);
                    assert_eq!(expected, "a string");
                    assert_eq!(found, "42");
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn output_wrapper_concatenates_array_parts() {
        let raw = apply("output-wrapper", json!(["/*! banner */\n", "%output%"])).unwrap();
        assert_eq!(raw.output_wrapper.as_deref(), Some("/*! banner */\n%output%"));
    }

    #[test]
    fn output_wrapper_rejects_non_string_array_element() {
        let err = apply("output-wrapper", json!(["ok", 7])).unwrap_err();
        assert!(matches!(err, ConfigError::WrongShape { option: "output-wrapper", .. }));
    }

    #[test]
    fn modules_must_be_an_object() {
        let err = apply("modules", json!("app.css")).unwrap_err();
        assert!(matches!(err, ConfigError::WrongShape { option: "modules", expected: "an object", .. }));
    }
}
