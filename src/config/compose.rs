//! Site configuration composition
//!
//! A site configuration is three layers merged in precedence order:
//! 1. Shared defaults (preset docs/theme options)
//! 2. Computed values (`url`, `baseUrl`, `customFields.siteId`,
//!    `customFields.interSite`) for the deployment mode
//! 3. The site's own override object
//!
//! The merged result is validated before it is returned, and records where
//! each layer came from.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;

use ifla_sites_meta::{current_mode, DeploymentMode, Origins, SiteError, SiteRegistry, UrlResolver};

use super::defaults::SharedDefaults;
use super::merge::{merge_layers, MergeError};
use super::validate::{validate_config, ValidationError};

/// Origin of a configuration layer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LayerOrigin {
    Shared,
    Computed,
    Override,
}

/// A contributing layer with provenance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigLayer {
    /// Which layer this is
    pub origin: LayerOrigin,

    /// File path (None for in-memory layers)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for in-memory layers)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl ConfigLayer {
    fn in_memory(origin: LayerOrigin) -> Self {
        Self {
            origin,
            path: None,
            digest: None,
        }
    }

    fn from_file(origin: LayerOrigin, path: &Path, digest: String) -> Self {
        Self {
            origin,
            path: Some(path.to_string_lossy().to_string()),
            digest: Some(digest),
        }
    }
}

/// Final configuration of one site, with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfiguration {
    /// Site this configuration is for
    pub site_id: String,

    /// Mode the URLs were computed for
    pub mode: DeploymentMode,

    /// The merged configuration object
    pub config: Value,

    /// Contributing layers in precedence order
    pub layers: Vec<ConfigLayer>,
}

impl SiteConfiguration {
    /// Get a config value by path (dot-separated)
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.config;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Get a config value as string
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }

    /// Get a config value as bool
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(|v| v.as_bool())
    }

    pub fn url(&self) -> Option<&str> {
        self.get_str("url")
    }

    pub fn base_url(&self) -> Option<&str> {
        self.get_str("baseUrl")
    }

    /// Absolute root URL of every site, keyed by site id
    pub fn inter_site(&self) -> Option<&Map<String, Value>> {
        self.get("customFields.interSite").and_then(|v| v.as_object())
    }

    /// Serialize the configuration object (without provenance) to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.config)
    }

    /// Write the configuration object to a file
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)
    }
}

/// Composition errors
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error(transparent)]
    Site(#[from] SiteError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error("Invalid site configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("{layer} must be an object, got {kind}")]
    NotAnObject { layer: String, kind: String },

    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Builds site configurations for one deployment mode
#[derive(Debug, Clone)]
pub struct ConfigComposer<'a> {
    resolver: UrlResolver<'a>,
    mode: DeploymentMode,
}

impl<'a> ConfigComposer<'a> {
    pub fn new(registry: &'a SiteRegistry, mode: DeploymentMode) -> Self {
        Self {
            resolver: UrlResolver::new(registry),
            mode,
        }
    }

    /// Composer for the mode selected by `DOCS_ENV`
    pub fn from_env(registry: &'a SiteRegistry) -> Self {
        Self::new(registry, current_mode())
    }

    pub fn with_origins(mut self, origins: Origins) -> Self {
        self.resolver = self.resolver.with_origins(origins);
        self
    }

    pub fn mode(&self) -> DeploymentMode {
        self.mode
    }

    pub fn resolver(&self) -> &UrlResolver<'a> {
        &self.resolver
    }

    /// Compose a site configuration from in-memory layers.
    ///
    /// `null` is accepted for either layer and means "nothing to add".
    pub fn compose(
        &self,
        site_id: &str,
        shared_defaults: &Value,
        overrides: &Value,
    ) -> Result<SiteConfiguration, ComposeError> {
        self.compose_layers(
            site_id,
            (shared_defaults.clone(), ConfigLayer::in_memory(LayerOrigin::Shared)),
            Some((overrides.clone(), ConfigLayer::in_memory(LayerOrigin::Override))),
        )
    }

    /// Compose a site configuration from layer files (`.toml` or `.json`).
    ///
    /// Without a shared defaults file the built-in [`SharedDefaults`] are used.
    pub fn compose_files(
        &self,
        site_id: &str,
        shared_path: Option<&Path>,
        override_path: Option<&Path>,
    ) -> Result<SiteConfiguration, ComposeError> {
        let shared = match shared_path {
            Some(path) => {
                let (value, digest) = load_layer_file(path)?;
                (value, ConfigLayer::from_file(LayerOrigin::Shared, path, digest))
            }
            None => (
                SharedDefaults::default().to_value(),
                ConfigLayer::in_memory(LayerOrigin::Shared),
            ),
        };

        let overrides = match override_path {
            Some(path) => {
                let (value, digest) = load_layer_file(path)?;
                Some((value, ConfigLayer::from_file(LayerOrigin::Override, path, digest)))
            }
            None => None,
        };

        self.compose_layers(site_id, shared, overrides)
    }

    fn compose_layers(
        &self,
        site_id: &str,
        shared: (Value, ConfigLayer),
        overrides: Option<(Value, ConfigLayer)>,
    ) -> Result<SiteConfiguration, ComposeError> {
        let (shared_value, shared_layer) = shared;
        let shared_value = require_object(shared_value, "shared defaults")?;

        let resolved = self.resolver.resolve(site_id, self.mode)?;
        let inter_site = self.resolver.resolve_all(self.mode);

        let presets = shared_value
            .get("presets")
            .cloned()
            .unwrap_or_else(|| json!([]));

        let computed = json!({
            "url": resolved.url,
            "baseUrl": resolved.base_url,
            "presets": presets,
            "customFields": {
                "siteId": site_id,
                "interSite": inter_site.to_value()
            }
        });

        let mut layers = vec![shared_value, computed];
        let mut provenance = vec![shared_layer, ConfigLayer::in_memory(LayerOrigin::Computed)];

        if let Some((value, layer)) = overrides {
            layers.push(require_object(value, "site override")?);
            provenance.push(layer);
        }

        let merged = merge_layers(layers)?;
        validate_config(&merged)?;

        tracing::debug!(
            site = site_id,
            mode = %self.mode,
            url = %resolved.url,
            layers = provenance.len(),
            "composed site configuration"
        );

        Ok(SiteConfiguration {
            site_id: site_id.to_string(),
            mode: self.mode,
            config: merged,
            layers: provenance,
        })
    }
}

fn require_object(value: Value, layer: &str) -> Result<Value, ComposeError> {
    match value {
        Value::Null => Ok(Value::Object(Map::new())),
        Value::Object(_) => Ok(value),
        other => Err(ComposeError::NotAnObject {
            layer: layer.to_string(),
            kind: kind_name(&other).to_string(),
        }),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Load a TOML or JSON layer file, returning the value and the digest of its bytes.
///
/// `.json` files are parsed as JSON; everything else as TOML.
pub fn load_layer_file(path: &Path) -> Result<(Value, String), ComposeError> {
    let bytes = fs::read(path)
        .map_err(|e| ComposeError::Io(format!("{}: {}", path.display(), e)))?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hex::encode(hasher.finalize());

    let contents = String::from_utf8(bytes)
        .map_err(|e| ComposeError::Parse(format!("{}: invalid UTF-8: {}", path.display(), e)))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let value = if is_json {
        serde_json::from_str(&contents)
            .map_err(|e| ComposeError::Parse(format!("{}: JSON parse error: {}", path.display(), e)))?
    } else {
        let toml_value: toml::Value = toml::from_str(&contents)
            .map_err(|e| ComposeError::Parse(format!("{}: TOML parse error: {}", path.display(), e)))?;
        toml_to_json(toml_value)
    };

    Ok((value, digest))
}

/// Convert TOML Value to JSON Value
fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}
