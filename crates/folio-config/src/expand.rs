//! `${VAR}` / `${VAR:-default}` expansion in config strings.

use std::borrow::Cow;

use crate::ConfigError;

/// Variable that was referenced without a default but is unset.
struct Unset(String);

/// Expand against the process environment.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    expand_with(value, field, |name| std::env::var(name).ok())
}

/// Expand with a custom variable lookup.
///
/// Values without `${` are returned untouched, so a literal `$` in a path
/// or URL survives.
fn expand_with<F>(value: &str, field: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |name| match lookup(name) {
        Some(found) => Ok(Some(found)),
        None => Err(Unset(name.to_owned())),
    })
    .map(Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}
