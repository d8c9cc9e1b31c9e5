//! Site registry, deployment modes and URL resolution.
//!
//! Every documentation site in the fleet is described once in a
//! [`SiteRegistry`]. Given a [`DeploymentMode`], the [`UrlResolver`] computes
//! the `url`/`baseUrl` pair of one site and the absolute root URL of every
//! site (the inter-site map used for cross-site navigation).

mod error;
mod mode;
mod registry;
mod resolve;

pub use error::{RegistryError, SiteError};
pub use mode::{current_mode, mode_from_env, mode_from_vars, DeploymentMode, MODE_ENV_VAR};
pub use registry::{SiteDescriptor, SiteRegistry};
pub use resolve::{
    InterSiteMap, Origins, ResolvedSiteUrl, UrlResolver, PREVIEW_ORIGIN, PRODUCTION_ORIGIN,
};
