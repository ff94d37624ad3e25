use regex::Regex;
use std::sync::OnceLock;

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"))
}

/// Expand environment variables in a string using ${VAR_NAME} syntax.
/// Unset variables are left as written.
pub fn expand_env_var_in_string(value: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    env_var_pattern()
        .replace_all(value, |caps: &regex::Captures| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Parse a positive number of seconds.
pub fn parse_timeout_secs(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().filter(|secs| *secs > 0)
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
