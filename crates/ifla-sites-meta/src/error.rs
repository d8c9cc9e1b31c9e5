//! Error types for site lookup and registry construction.

/// Errors raised while resolving a site URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SiteError {
    /// The site key is not present in the registry.
    #[error("Unknown site '{key}' (known sites: {})", known.join(", "))]
    UnknownSite { key: String, known: Vec<String> },

    /// An explicit mode value outside `local | preview | prod`.
    #[error("Invalid deployment mode '{0}': expected one of local, preview, prod")]
    InvalidMode(String),
}

/// Errors raised when a registry violates its invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("No sites configured")]
    Empty,

    #[error("Duplicate site key: '{0}'")]
    DuplicateKey(String),

    #[error("Sites '{first}' and '{second}' both have an empty path (only one root site is allowed)")]
    MultipleRoots { first: String, second: String },

    #[error("Sites '{first}' and '{second}' share the path segment '{path}'")]
    DuplicatePath {
        path: String,
        first: String,
        second: String,
    },

    #[error("Sites '{first}' and '{second}' share the dev port {port}")]
    DuplicatePort { port: u16, first: String, second: String },

    #[error("Site '{key}': invalid value for '{field}': {reason}")]
    InvalidValue {
        key: String,
        field: String,
        reason: String,
    },
}
