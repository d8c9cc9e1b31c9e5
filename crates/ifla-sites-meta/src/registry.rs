//! The site registry.
//!
//! One entry per documentation site: its key, the path segment it is served
//! under, and the port of its dev server.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, SiteError};

/// Canonical site table: (key, path segment, dev port).
const BUILTIN_SITES: &[(&str, &str, u16)] = &[
    ("portal", "", 3000),
    ("isbdm", "isbdm", 3001),
    ("lrm", "lrm", 3002),
    ("fr", "fr", 3003),
    ("isbd", "isbd", 3004),
    ("muldicat", "muldicat", 3005),
    ("unimarc", "unimarc", 3006),
];

/// A single site entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteDescriptor {
    /// Unique site identifier (e.g. "isbdm")
    pub key: String,

    /// Path segment the site is served under; empty for the root (portal) site
    #[serde(default)]
    pub path: String,

    /// Local dev server port
    pub port: u16,
}

impl SiteDescriptor {
    pub fn new(key: impl Into<String>, path: impl Into<String>, port: u16) -> Self {
        Self {
            key: key.into(),
            path: path.into(),
            port,
        }
    }

    /// Whether this is the root site (served at `/`)
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Base path of the site: `/` for the root site, `/<path>/` otherwise
    pub fn base_url(&self) -> String {
        if self.is_root() {
            "/".to_string()
        } else {
            format!("/{}/", self.path)
        }
    }

    fn validate(&self) -> Result<(), RegistryError> {
        if !key_pattern().is_match(&self.key) {
            return Err(RegistryError::InvalidValue {
                key: self.key.clone(),
                field: "key".to_string(),
                reason: "key must start with a letter or digit and contain only alphanumeric characters, dashes, and underscores".to_string(),
            });
        }

        if !self.is_root() && !path_pattern().is_match(&self.path) {
            return Err(RegistryError::InvalidValue {
                key: self.key.clone(),
                field: "path".to_string(),
                reason: format!("'{}' is not a single URL path segment", self.path),
            });
        }

        if self.port == 0 {
            return Err(RegistryError::InvalidValue {
                key: self.key.clone(),
                field: "port".to_string(),
                reason: "port cannot be 0".to_string(),
            });
        }

        Ok(())
    }
}

fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("static pattern"))
}

fn path_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("static pattern"))
}

/// Immutable, validated table of sites in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRegistry {
    sites: Vec<SiteDescriptor>,
}

impl SiteRegistry {
    /// Build a registry, checking that keys, paths and ports are unique and
    /// that at most one site is the root.
    pub fn new(sites: Vec<SiteDescriptor>) -> Result<Self, RegistryError> {
        if sites.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut keys: HashSet<&str> = HashSet::new();
        let mut paths: HashMap<&str, &str> = HashMap::new();
        let mut ports: HashMap<u16, &str> = HashMap::new();
        let mut root: Option<&str> = None;

        for site in &sites {
            site.validate()?;

            if !keys.insert(&site.key) {
                return Err(RegistryError::DuplicateKey(site.key.clone()));
            }

            if site.is_root() {
                if let Some(first) = root {
                    return Err(RegistryError::MultipleRoots {
                        first: first.to_string(),
                        second: site.key.clone(),
                    });
                }
                root = Some(site.key.as_str());
            } else if let Some(first) = paths.insert(&site.path, &site.key) {
                return Err(RegistryError::DuplicatePath {
                    path: site.path.clone(),
                    first: first.to_string(),
                    second: site.key.clone(),
                });
            }

            if let Some(first) = ports.insert(site.port, &site.key) {
                return Err(RegistryError::DuplicatePort {
                    port: site.port,
                    first: first.to_string(),
                    second: site.key.clone(),
                });
            }
        }

        Ok(Self { sites })
    }

    /// The canonical registry, built once per process.
    pub fn builtin() -> &'static SiteRegistry {
        static BUILTIN: OnceLock<SiteRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| SiteRegistry {
            sites: BUILTIN_SITES
                .iter()
                .map(|(key, path, port)| SiteDescriptor::new(*key, *path, *port))
                .collect(),
        })
    }

    /// Look up a site, failing with [`SiteError::UnknownSite`] if absent.
    pub fn lookup(&self, key: &str) -> Result<&SiteDescriptor, SiteError> {
        self.get(key).ok_or_else(|| SiteError::UnknownSite {
            key: key.to_string(),
            known: self.keys().map(str::to_string).collect(),
        })
    }

    pub fn get(&self, key: &str) -> Option<&SiteDescriptor> {
        self.sites.iter().find(|s| s.key == key)
    }

    /// All sites in insertion order.
    pub fn all(&self) -> impl Iterator<Item = (&str, &SiteDescriptor)> {
        self.sites.iter().map(|s| (s.key.as_str(), s))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sites.iter().map(|s| s.key.as_str())
    }

    /// The root site, if the registry has one.
    pub fn root(&self) -> Option<&SiteDescriptor> {
        self.sites.iter().find(|s| s.is_root())
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}
