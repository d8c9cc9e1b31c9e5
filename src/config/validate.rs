//! Checks a composed site configuration before it is handed out.

use serde_json::Value;

/// A configuration field that breaks the shape the framework expects
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid '{field}': {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Validate a merged configuration.
///
/// Returns the first violation found.
pub fn validate_config(config: &Value) -> Result<(), ValidationError> {
    let url = require_str(config, "url")?;
    check_absolute(url, "url")?;
    if url.ends_with('/') {
        return Err(ValidationError::new("url", format!("'{}' must not end with '/'", url)));
    }

    let base_url = require_str(config, "baseUrl")?;
    if !base_url.starts_with('/') || !base_url.ends_with('/') {
        return Err(ValidationError::new(
            "baseUrl",
            format!("'{}' must start and end with '/'", base_url),
        ));
    }

    if !config.get("presets").is_some_and(Value::is_array) {
        return Err(ValidationError::new("presets", "must be an array"));
    }

    let custom = config
        .get("customFields")
        .ok_or_else(|| ValidationError::new("customFields", "missing"))?;

    if !custom.get("siteId").is_some_and(Value::is_string) {
        return Err(ValidationError::new("customFields.siteId", "must be a string"));
    }

    let inter_site = custom
        .get("interSite")
        .and_then(Value::as_object)
        .ok_or_else(|| ValidationError::new("customFields.interSite", "must be an object"))?;

    for (key, link) in inter_site {
        let field = format!("customFields.interSite.{}", key);
        let link = link
            .as_str()
            .ok_or_else(|| ValidationError::new(field.clone(), "must be a string"))?;
        check_absolute(link, &field)?;
        if !link.ends_with('/') {
            return Err(ValidationError::new(field, format!("'{}' must end with '/'", link)));
        }
    }

    Ok(())
}

fn require_str<'a>(config: &'a Value, field: &str) -> Result<&'a str, ValidationError> {
    match config.get(field) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ValidationError::new(field, "must be a string")),
        None => Err(ValidationError::new(field, "missing")),
    }
}

fn check_absolute(value: &str, field: &str) -> Result<(), ValidationError> {
    let parsed = url::Url::parse(value)
        .map_err(|e| ValidationError::new(field, format!("'{}' is not an absolute URL: {}", value, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::new(
            field,
            format!("scheme '{}' not supported, must be http or https", parsed.scheme()),
        ));
    }
    if parsed.host_str().is_none() {
        return Err(ValidationError::new(field, "URL must have a host"));
    }
    Ok(())
}
