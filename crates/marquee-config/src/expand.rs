//! Environment variable expansion for configuration strings.
//!
//! Only the braced forms are recognized:
//! - `${VAR}` - value of VAR, error when unset
//! - `${VAR:-default}` - value of VAR, or `default` when unset
//!
//! Any other `$`, including `$VAR`, is kept as written.

use serde_json::Value;

use crate::ConfigError;

/// Expand `${...}` references in a single string.
///
/// `field` names the config key in error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(&escape_bare_dollars(value), |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var)
            .map(Some)
            .map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Expand every string nested inside a JSON value, in place.
///
/// Used for the free-form `[app]` table. Field names in errors are built
/// from the table path, e.g. `app.CHAT.token`.
pub(crate) fn expand_json(value: &mut Value, field: &str) -> Result<(), ConfigError> {
    match value {
        Value::String(s) => *s = expand_env(s, field)?,
        Value::Array(items) => {
            for (i, item) in items.iter_mut().enumerate() {
                expand_json(item, &format!("{field}[{i}]"))?;
            }
        }
        Value::Object(map) => {
            for (key, item) in map.iter_mut() {
                expand_json(item, &format!("{field}.{key}"))?;
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
    Ok(())
}

struct UnsetVar(String);

/// Double every `$` that does not open a `${...}` reference, so the
/// expander writes `$VAR` and `$5` back out unchanged.
fn escape_bare_dollars(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(idx) = rest.find('$') {
        escaped.push_str(&rest[..idx]);
        rest = &rest[idx..];
        match rest.strip_prefix("${").and_then(|inner| inner.find('}')) {
            Some(close) => {
                let end = close + 3;
                escaped.push_str(&rest[..end]);
                rest = &rest[end..];
            }
            None => {
                escaped.push_str("$$");
                rest = &rest[1..];
            }
        }
    }
    escaped.push_str(rest);
    escaped
}
