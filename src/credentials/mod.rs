/// Environment variable holding the Ashby API key
pub const ENV_API_KEY_VAR: &str = "ASHBY_API_KEY";

/// Fallback variable name, checked when `ASHBY_API_KEY` is unset or empty
pub const ENV_API_KEY_FALLBACK_VAR: &str = "ASHBY_KEY";

/// Read the Ashby API key from the environment.
/// Returns Some(key) if either variable is set and non-empty, None otherwise.
pub fn get_api_key_from_env() -> Option<String> {
    api_key_from(|name| std::env::var(name).ok())
}

fn api_key_from<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    [ENV_API_KEY_VAR, ENV_API_KEY_FALLBACK_VAR]
        .into_iter()
        .filter_map(|name| lookup(name))
        .map(|val| val.trim().to_string())
        .find(|val| !val.is_empty())
}
