//! Deployment mode selection.
//!
//! The mode is picked from `DOCS_ENV`. The environment is passed in as a
//! lookup function so callers (and tests) decide where it comes from.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SiteError;

/// Environment variable that selects the deployment mode.
pub const MODE_ENV_VAR: &str = "DOCS_ENV";

/// Where the sites are being served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// Dev servers on localhost, one port per site.
    #[default]
    Local,
    /// Staging deployment on GitHub Pages.
    Preview,
    /// Production custom domain.
    Prod,
}

impl DeploymentMode {
    /// All modes, in a stable order.
    pub const ALL: [DeploymentMode; 3] = [Self::Local, Self::Preview, Self::Prod];

    /// Canonical name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Preview => "preview",
            Self::Prod => "prod",
        }
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentMode {
    type Err = SiteError;

    /// Strict parse: only the exact canonical names are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| SiteError::InvalidMode(s.to_string()))
    }
}

/// Determine the mode from an environment lookup.
///
/// Never fails: unset, empty and unrecognized values all fall back to
/// [`DeploymentMode::Local`].
pub fn mode_from_env<F>(lookup: F) -> DeploymentMode
where
    F: Fn(&str) -> Option<String>,
{
    let raw = match lookup(MODE_ENV_VAR) {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => {
            tracing::debug!("{} not set, using local mode", MODE_ENV_VAR);
            return DeploymentMode::Local;
        }
    };

    match raw.parse() {
        Ok(mode) => {
            tracing::debug!(mode = %mode, "deployment mode from {}", MODE_ENV_VAR);
            mode
        }
        Err(_) => {
            tracing::warn!(
                value = %raw,
                "{} has an unrecognized value; valid values are local, preview, prod. Using local",
                MODE_ENV_VAR
            );
            DeploymentMode::Local
        }
    }
}

/// Determine the mode from an explicit variable map.
pub fn mode_from_vars(vars: &HashMap<String, String>) -> DeploymentMode {
    mode_from_env(|name| vars.get(name).cloned())
}

/// Determine the mode from the process environment.
///
/// Reads the environment on every call.
pub fn current_mode() -> DeploymentMode {
    mode_from_env(|name| std::env::var(name).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_unset_defaults_to_local() {
        assert_eq!(mode_from_vars(&HashMap::new()), DeploymentMode::Local);
    }

    #[test]
    fn test_empty_defaults_to_local() {
        assert_eq!(mode_from_vars(&vars(&[("DOCS_ENV", "")])), DeploymentMode::Local);
        assert_eq!(mode_from_vars(&vars(&[("DOCS_ENV", "   ")])), DeploymentMode::Local);
    }

    #[test]
    fn test_unrecognized_defaults_to_local() {
        assert_eq!(
            mode_from_vars(&vars(&[("DOCS_ENV", "staging")])),
            DeploymentMode::Local
        );
    }

    #[test]
    fn test_recognized_values() {
        assert_eq!(mode_from_vars(&vars(&[("DOCS_ENV", "local")])), DeploymentMode::Local);
        assert_eq!(
            mode_from_vars(&vars(&[("DOCS_ENV", "preview")])),
            DeploymentMode::Preview
        );
        assert_eq!(mode_from_vars(&vars(&[("DOCS_ENV", "prod")])), DeploymentMode::Prod);
    }

    #[test]
    fn test_other_variables_ignored() {
        let env = vars(&[("NODE_ENV", "production")]);
        assert_eq!(mode_from_vars(&env), DeploymentMode::Local);
    }

    #[test]
    fn test_near_miss_values_default_to_local() {
        for value in ["production", "Prod", " prod ", "PREVIEW", "localhost", "gh-pages"] {
            assert_eq!(
                mode_from_vars(&vars(&[("DOCS_ENV", value)])),
                DeploymentMode::Local,
                "{value:?}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_near_misses() {
        for value in ["production", "Prod", " prod ", "PREVIEW", "localhost", "github"] {
            let err = value.parse::<DeploymentMode>().unwrap_err();
            assert_eq!(err, SiteError::InvalidMode(value.to_string()));
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "staging".parse::<DeploymentMode>().unwrap_err();
        assert_eq!(err, SiteError::InvalidMode("staging".to_string()));
    }

    #[test]
    fn test_display_roundtrips_canonical_names() {
        for mode in DeploymentMode::ALL {
            assert_eq!(mode.to_string().parse::<DeploymentMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&DeploymentMode::Preview).unwrap();
        assert_eq!(json, "\"preview\"");
    }
}
