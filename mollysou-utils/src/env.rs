use std::env;
use std::fmt::Display;
use std::str::FromStr;

use anyhow::Context as _;
use tracing::warn;

/// Read a boolean flag; `1`, `true`, `yes` and `on` count as enabled.
pub fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => parse_bool(&value),
        Err(_) => default,
    }
}

/// Read an optional value, falling back to `default` when unset or invalid.
pub fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(value) => value.trim().parse::<T>().unwrap_or_else(|err| {
            warn!(key, %err, "invalid environment value; using default");
            default
        }),
        Err(_) => default,
    }
}

/// Read a value that has no sensible default.
pub fn env_required<T>(key: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = env::var(key).with_context(|| format!("{key} must be set"))?;
    raw.trim()
        .parse::<T>()
        .map_err(|err| anyhow::anyhow!("invalid {key} value `{raw}`: {err}"))
}

fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::parse_bool;

    #[test]
    fn truthy_values() {
        for raw in ["1", "true", "TRUE", " yes ", "On"] {
            assert!(parse_bool(raw), "{raw}");
        }
    }

    #[test]
    fn falsy_values() {
        for raw in ["0", "false", "off", "", "enabled"] {
            assert!(!parse_bool(raw), "{raw}");
        }
    }
}
