//! Per-invocation overrides.
//!
//! Overrides arrive as free-form `--key value` or `key=value` pairs. They are
//! parsed once into [`RunOptions`]; boolean values are strict, so an
//! unparseable value is an error rather than a silent `false`.

use serde::Serialize;

use crate::error::{Error, Result};

pub const KNOWN_KEYS: &[&str] = &[
    "branch",
    "require_clean",
    "skip_syncdb",
    "skip_migrate",
    "restart_nginx",
    "bounce_services_only_if_running",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_clean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_syncdb: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_migrate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart_nginx: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounce_services_only_if_running: Option<bool>,
}

impl RunOptions {
    /// Parse trailing CLI arguments into options.
    ///
    /// Accepts `--key value`, `--key=value` and `key=value`. Keys are
    /// lower-cased and `-` is treated as `_`.
    pub fn from_args(args: &[String]) -> Result<Self> {
        Self::from_pairs(parse_pairs(args)?)
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = RunOptions::default();
        for (key, value) in pairs {
            options.set(key.as_ref(), value.as_ref())?;
        }
        Ok(options)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let key = normalize_key(key);
        match key.as_str() {
            "branch" => {
                if value.trim().is_empty() {
                    return Err(Error::validation_invalid_argument(
                        "branch",
                        "Branch name cannot be empty",
                        None,
                        None,
                    ));
                }
                self.branch = Some(value.trim().to_string());
            }
            "require_clean" => self.require_clean = Some(parse_bool(&key, value)?),
            "skip_syncdb" => self.skip_syncdb = Some(parse_bool(&key, value)?),
            "skip_migrate" => self.skip_migrate = Some(parse_bool(&key, value)?),
            "restart_nginx" => self.restart_nginx = Some(parse_bool(&key, value)?),
            "bounce_services_only_if_running" => {
                self.bounce_services_only_if_running = Some(parse_bool(&key, value)?)
            }
            _ => {
                return Err(Error::validation_invalid_argument(
                    key.clone(),
                    format!("Unknown option '{}'", key),
                    Some(value.to_string()),
                    Some(KNOWN_KEYS.iter().map(|k| k.to_string()).collect()),
                ))
            }
        }
        Ok(())
    }
}

fn normalize_key(key: &str) -> String {
    key.trim()
        .trim_start_matches('-')
        .trim_start_matches(':')
        .to_lowercase()
        .replace('-', "_")
}

fn parse_pairs(args: &[String]) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if let Some((key, value)) = arg.split_once('=') {
            pairs.push((key.to_string(), value.to_string()));
            continue;
        }

        if let Some(key) = arg.strip_prefix("--") {
            let value = iter.next().ok_or_else(|| {
                Error::validation_invalid_argument(
                    key,
                    format!("Missing value for option --{}", key),
                    None,
                    None,
                )
            })?;
            pairs.push((key.to_string(), value.to_string()));
            continue;
        }

        return Err(Error::validation_invalid_argument(
            "overrides",
            format!("Expected '--key value' or 'key=value', got '{}'", arg),
            Some(arg.clone()),
            None,
        ));
    }

    Ok(pairs)
}

/// Strict boolean parsing for override values.
pub fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Ok(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Ok(false),
        _ => Err(Error::validation_invalid_argument(
            key,
            format!("'{}' is not a boolean value for '{}'", value, key),
            Some(value.to_string()),
            Some(vec!["true".to_string(), "false".to_string()]),
        )),
    }
}

/// Override value, then settings value.
///
/// Hard-coded defaults are already folded into the settings value during
/// [`crate::settings::Settings::new`].
pub fn resolve_flag(override_value: Option<bool>, settings_value: bool) -> bool {
    override_value.unwrap_or(settings_value)
}
