//! Site registry file
//!
//! Parses and validates a TOML file describing the sites of a deployment,
//! replacing the built-in registry. Each `[[site]]` entry gives the site key,
//! its path segment (empty for the portal) and its dev server port. An
//! optional `[origins]` table overrides the hosted origins.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use ifla_sites_meta::{Origins, RegistryError, SiteDescriptor, SiteRegistry};

/// Raw registry file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitesFile {
    /// Schema version for forward compatibility
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Hosted origins (defaults to the production/staging origins)
    #[serde(default)]
    pub origins: Option<Origins>,

    /// List of sites
    #[serde(default, rename = "site")]
    pub sites: Vec<SiteDescriptor>,
}

fn default_schema_version() -> u32 {
    1
}

/// Errors that can occur when loading a registry file
#[derive(Debug, thiserror::Error)]
pub enum SitesFileError {
    #[error("Failed to read sites file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Sites file not found: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported schema_version {0} (expected 1)")]
    UnsupportedSchema(u32),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Invalid origin '{field}': {reason}")]
    InvalidOrigin { field: String, reason: String },
}

/// A validated registry file: the registry plus the origins to resolve against
#[derive(Debug, Clone)]
pub struct LoadedSites {
    pub registry: SiteRegistry,
    pub origins: Origins,
}

impl SitesFile {
    /// Load and validate a registry file
    pub fn load(path: &Path) -> Result<LoadedSites, SitesFileError> {
        if !path.exists() {
            return Err(SitesFileError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let loaded = Self::parse(&content)?;
        tracing::debug!(
            path = %path.display(),
            sites = loaded.registry.len(),
            "loaded site registry"
        );
        Ok(loaded)
    }

    /// Parse and validate a registry from a TOML string
    pub fn parse(content: &str) -> Result<LoadedSites, SitesFileError> {
        let file: SitesFile = toml::from_str(content)?;
        file.into_loaded()
    }

    fn into_loaded(self) -> Result<LoadedSites, SitesFileError> {
        if self.schema_version != 1 {
            return Err(SitesFileError::UnsupportedSchema(self.schema_version));
        }

        let origins = match self.origins {
            Some(raw) => {
                check_origin("production", &raw.production)?;
                check_origin("preview", &raw.preview)?;
                Origins::new(raw.production, raw.preview)
            }
            None => Origins::default(),
        };

        let registry = SiteRegistry::new(self.sites)?;
        Ok(LoadedSites { registry, origins })
    }
}

fn check_origin(field: &str, value: &str) -> Result<(), SitesFileError> {
    let invalid = |reason: String| SitesFileError::InvalidOrigin {
        field: field.to_string(),
        reason,
    };

    let parsed = url::Url::parse(value).map_err(|e| invalid(format!("'{}': {}", value, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("scheme '{}' must be http or https", parsed.scheme())));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid(format!("'{}' must not carry a query or fragment", value)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifla_sites_meta::{DeploymentMode, UrlResolver};

    #[test]
    fn test_parse_basic_file() {
        let content = r#"
            schema_version = 1

            [[site]]
            key = "portal"
            path = ""
            port = 3000

            [[site]]
            key = "isbdm"
            path = "isbdm"
            port = 3001
        "#;

        let loaded = SitesFile::parse(content).unwrap();
        assert_eq!(loaded.registry.len(), 2);
        assert_eq!(loaded.origins, Origins::default());

        let isbdm = loaded.registry.lookup("isbdm").unwrap();
        assert_eq!(isbdm.port, 3001);
        assert_eq!(isbdm.path, "isbdm");
    }

    #[test]
    fn test_path_defaults_to_root() {
        let content = r#"
            [[site]]
            key = "portal"
            port = 3000
        "#;

        let loaded = SitesFile::parse(content).unwrap();
        assert!(loaded.registry.lookup("portal").unwrap().is_root());
    }

    #[test]
    fn test_custom_origins() {
        let content = r#"
            [origins]
            production = "https://standards.example.org/"
            preview = "https://example.github.io/standards-dev"

            [[site]]
            key = "lrm"
            path = "lrm"
            port = 3002
        "#;

        let loaded = SitesFile::parse(content).unwrap();
        let resolver = UrlResolver::new(&loaded.registry).with_origins(loaded.origins.clone());

        let map = resolver.resolve_all(DeploymentMode::Prod);
        assert_eq!(map.get("lrm"), Some("https://standards.example.org/lrm/"));
    }

    #[test]
    fn test_invalid_origin_rejected() {
        let content = r#"
            [origins]
            production = "iflastandards.info"
            preview = "https://example.github.io/standards-dev"

            [[site]]
            key = "lrm"
            path = "lrm"
            port = 3002
        "#;

        let result = SitesFile::parse(content);
        assert!(matches!(result, Err(SitesFileError::InvalidOrigin { field, .. }) if field == "production"));
    }

    #[test]
    fn test_duplicate_port_rejected() {
        let content = r#"
            [[site]]
            key = "portal"
            port = 3000

            [[site]]
            key = "isbdm"
            path = "isbdm"
            port = 3000
        "#;

        let result = SitesFile::parse(content);
        assert!(matches!(
            result,
            Err(SitesFileError::Registry(RegistryError::DuplicatePort { port: 3000, .. }))
        ));
    }

    #[test]
    fn test_no_sites_rejected() {
        let result = SitesFile::parse("schema_version = 1");
        assert!(matches!(result, Err(SitesFileError::Registry(RegistryError::Empty))));
    }

    #[test]
    fn test_unsupported_schema() {
        let content = r#"
            schema_version = 2

            [[site]]
            key = "portal"
            port = 3000
        "#;

        assert!(matches!(
            SitesFile::parse(content),
            Err(SitesFileError::UnsupportedSchema(2))
        ));
    }

    #[test]
    fn test_missing_port_rejected() {
        let content = r#"
            [[site]]
            key = "portal"
        "#;

        assert!(matches!(SitesFile::parse(content), Err(SitesFileError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = SitesFile::load(Path::new("/nonexistent/sites.toml"));
        assert!(matches!(result, Err(SitesFileError::NotFound(_))));
    }
}
