use std::{env, str::FromStr};

/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Reads and parses the environment variable `name`.
///
/// Returns `Ok(None)` when the variable is not set, and the raw string alongside the parse error when it is set to
/// something unparseable, so that callers can log a useful message before falling back to a default.
pub fn parse_env_var<T: FromStr>(name: &str) -> Result<Option<T>, (String, T::Err)> {
    match env::var(name) {
        Ok(s) => s.trim().parse::<T>().map(Some).map_err(|e| (s, e)),
        Err(_) => Ok(None),
    }
}
