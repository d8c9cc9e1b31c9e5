//! URL resolution for one site and for the whole fleet.
//!
//! In `prod` and `preview` every site shares one origin and is told apart by
//! its base path. In `local` every site has its own origin (its dev port) and
//! no shared prefix.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::SiteError;
use crate::mode::DeploymentMode;
use crate::registry::{SiteDescriptor, SiteRegistry};

/// Production origin.
pub const PRODUCTION_ORIGIN: &str = "https://iflastandards.info";

/// Staging origin, including the repository path prefix.
pub const PREVIEW_ORIGIN: &str = "https://iflastandards.github.io/standards-dev";

/// Shared origins for the hosted modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origins {
    pub production: String,
    pub preview: String,
}

impl Default for Origins {
    fn default() -> Self {
        Self {
            production: PRODUCTION_ORIGIN.to_string(),
            preview: PREVIEW_ORIGIN.to_string(),
        }
    }
}

impl Origins {
    /// Trailing slashes are dropped so `origin + baseUrl` never doubles up.
    pub fn new(production: impl Into<String>, preview: impl Into<String>) -> Self {
        Self {
            production: production.into().trim_end_matches('/').to_string(),
            preview: preview.into().trim_end_matches('/').to_string(),
        }
    }

    fn origin_for(&self, site: &SiteDescriptor, mode: DeploymentMode) -> String {
        match mode {
            DeploymentMode::Prod => self.production.clone(),
            DeploymentMode::Preview => self.preview.clone(),
            DeploymentMode::Local => format!("http://localhost:{}", site.port),
        }
    }
}

/// `url` and `baseUrl` of one site under one mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSiteUrl {
    /// Origin, without a trailing slash
    pub url: String,

    /// Base path, starting and ending with `/`
    #[serde(rename = "baseUrl")]
    pub base_url: String,
}

impl ResolvedSiteUrl {
    /// Absolute root URL of the site (`url + baseUrl`).
    pub fn root(&self) -> String {
        format!("{}{}", self.url, self.base_url)
    }
}

/// Absolute root URL of every site, in registry order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterSiteMap {
    entries: Vec<(String, String)>,
}

impl InterSiteMap {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// JSON object form, as stored under `customFields.interSite`; keeps
    /// registry order.
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        Value::Object(map)
    }
}

impl Serialize for InterSiteMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Computes site URLs from a registry.
#[derive(Debug, Clone)]
pub struct UrlResolver<'a> {
    registry: &'a SiteRegistry,
    origins: Origins,
}

impl<'a> UrlResolver<'a> {
    pub fn new(registry: &'a SiteRegistry) -> Self {
        Self {
            registry,
            origins: Origins::default(),
        }
    }

    /// Use other hosted origins. Trailing slashes are dropped here too, so a
    /// struct literal or a deserialized value behaves like [`Origins::new`].
    pub fn with_origins(mut self, origins: Origins) -> Self {
        self.origins = Origins::new(origins.production, origins.preview);
        self
    }

    pub fn registry(&self) -> &'a SiteRegistry {
        self.registry
    }

    pub fn origins(&self) -> &Origins {
        &self.origins
    }

    /// Resolve `url` and `baseUrl` for one site.
    pub fn resolve(&self, key: &str, mode: DeploymentMode) -> Result<ResolvedSiteUrl, SiteError> {
        let site = self.registry.lookup(key)?;
        Ok(self.resolve_descriptor(site, mode))
    }

    /// Resolve with an explicitly named mode; the name is parsed strictly.
    pub fn resolve_named(&self, key: &str, mode: &str) -> Result<ResolvedSiteUrl, SiteError> {
        let mode: DeploymentMode = mode.parse()?;
        self.resolve(key, mode)
    }

    /// Absolute root URL of every registered site.
    pub fn resolve_all(&self, mode: DeploymentMode) -> InterSiteMap {
        let entries = self
            .registry
            .all()
            .map(|(key, site)| (key.to_string(), self.resolve_descriptor(site, mode).root()))
            .collect();
        InterSiteMap { entries }
    }

    /// Absolute URL of a page on a site.
    ///
    /// One leading `/` of `path` is dropped; an empty path (or `/`) links to
    /// the site root.
    pub fn site_url(&self, key: &str, path: &str, mode: DeploymentMode) -> Result<String, SiteError> {
        let root = self.resolve(key, mode)?.root();
        let sub = path.strip_prefix('/').unwrap_or(path);
        Ok(format!("{}{}", root, sub))
    }

    fn resolve_descriptor(&self, site: &SiteDescriptor, mode: DeploymentMode) -> ResolvedSiteUrl {
        ResolvedSiteUrl {
            url: self.origins.origin_for(site, mode),
            base_url: site.base_url(),
        }
    }
}
