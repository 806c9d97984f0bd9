//! Backend-specific CLI options, namespaced `--<backend>.<key>[=value]` and
//! extracted from argv before the core option parser ever sees them.
//!
//! Adapted from `ior-core`'s `backend_options` module; generalized from a
//! single hardcoded prefix to any registered backend name.

use std::collections::BTreeMap;

/// Value of a backend-specific option.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// Boolean flag with no value (e.g. `--posix.direct`).
    Flag,
    /// String value (e.g. `--posix.root=/tmp/mdio`).
    Str(String),
}

impl OptionValue {
    pub fn is_flag(&self) -> bool {
        matches!(self, OptionValue::Flag)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            OptionValue::Flag => None,
        }
    }

    /// Parse as i64. `Flag` is treated as `1`.
    pub fn as_i64(&self) -> Result<i64, crate::DriverError> {
        match self {
            OptionValue::Flag => Ok(1),
            OptionValue::Str(s) => s
                .parse::<i64>()
                .map_err(|_| crate::DriverError::InvalidConfiguration(format!("not an integer: {s}"))),
        }
    }

    /// Parse as bool. `Flag` -> true, "0"/"false"/"no" -> false, otherwise true.
    pub fn as_bool(&self) -> bool {
        match self {
            OptionValue::Flag => true,
            OptionValue::Str(s) => !matches!(s.as_str(), "0" | "false" | "no"),
        }
    }
}

/// Options extracted from argv, keyed as `"<backend>.<key>"`.
#[derive(Debug, Clone, Default)]
pub struct BackendOptions {
    opts: BTreeMap<String, OptionValue>,
}

impl BackendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, value: OptionValue) {
        self.opts.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.opts.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.opts.is_empty()
    }

    /// Iterate over options matching a given backend-name prefix.
    pub fn for_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a OptionValue)> {
        let prefix_dot = format!("{prefix}.");
        self.opts
            .iter()
            .filter_map(move |(k, v)| k.strip_prefix(&prefix_dot).map(|suffix| (suffix, v)))
    }

    pub fn has_prefix(&self, prefix: &str) -> bool {
        let prefix_dot = format!("{prefix}.");
        self.opts.keys().any(|k| k.starts_with(&prefix_dot))
    }
}

fn is_backend_option(arg: &str) -> bool {
    let Some(body) = arg.strip_prefix("--") else {
        return false;
    };
    let name = body.split('=').next().unwrap_or(body);
    let segments: Vec<&str> = name.split('.').collect();
    if segments.len() < 2 {
        return false;
    }
    segments
        .iter()
        .all(|s| !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-'))
}

/// Extract backend-specific options from raw command-line arguments.
///
/// Returns `(filtered_args, backend_options)` where `filtered_args` has all
/// backend options removed (suitable for passing to `clap`).
///
/// Supported forms:
/// - `--prefix.key=value`  -> `Str(value)`
/// - `--prefix.key value`  -> `Str(value)` (if next arg doesn't start with `-`)
/// - `--prefix.key`        -> `Flag` (if next arg starts with `-` or is last)
pub fn extract_backend_options(args: Vec<String>) -> (Vec<String>, BackendOptions) {
    let mut filtered = Vec::new();
    let mut opts = BackendOptions::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if !is_backend_option(arg) {
            filtered.push(arg.clone());
            i += 1;
            continue;
        }

        let body = arg.strip_prefix("--").unwrap();

        if let Some((name, value)) = body.split_once('=') {
            opts.insert(name.to_string(), OptionValue::Str(value.to_string()));
            i += 1;
        } else if i + 1 < args.len() && !args[i + 1].starts_with('-') {
            opts.insert(body.to_string(), OptionValue::Str(args[i + 1].clone()));
            i += 2;
        } else {
            opts.insert(body.to_string(), OptionValue::Flag);
            i += 1;
        }
    }

    (filtered, opts)
}
