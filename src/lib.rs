//! IFLA documentation sites - URL and configuration resolution
//!
//! This crate derives the configuration of every documentation site in the
//! fleet: the `url`/`baseUrl` pair for the active deployment mode, absolute
//! links to every other site, and the final configuration object merged from
//! shared defaults and a site override.

pub mod config;
pub mod sites_file;

pub use config::{ComposeError, ConfigComposer, SharedDefaults, SiteConfiguration};
pub use ifla_sites_meta::{
    current_mode, DeploymentMode, InterSiteMap, Origins, ResolvedSiteUrl, SiteDescriptor,
    SiteError, SiteRegistry, UrlResolver,
};
pub use sites_file::{LoadedSites, SitesFile, SitesFileError};
