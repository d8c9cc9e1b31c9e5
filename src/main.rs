//! IFLA sites CLI
//!
//! Entry point for the `ifla-sites` command-line tool.

use clap::{Parser, Subcommand};
use ifla_sites::config::SharedDefaults;
use ifla_sites::{
    current_mode, ConfigComposer, DeploymentMode, LoadedSites, Origins, SiteRegistry, SitesFile,
    UrlResolver,
};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
const LOG_ENV_VAR: &str = "IFLA_SITES_LOG";

#[derive(Parser)]
#[command(name = "ifla-sites")]
#[command(about = "URL and configuration resolution for the IFLA documentation sites", version)]
struct Cli {
    /// Path to a site registry file (default: built-in registry)
    #[arg(long, short = 's', global = true)]
    sites: Option<PathBuf>,

    /// Deployment mode: local, preview or prod (default: from DOCS_ENV)
    #[arg(long, short = 'm', global = true)]
    mode: Option<DeploymentMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered sites
    Sites {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print url and baseUrl of a site
    Resolve {
        /// Site key (e.g. "isbdm")
        site: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print the absolute root URL of every site as JSON
    InterSite,

    /// Print the absolute URL of a page on a site
    Link {
        /// Site key
        site: String,

        /// Page path within the site (default: site root)
        #[arg(default_value = "")]
        path: String,
    },

    /// Compose the full configuration of a site
    Compose {
        /// Site key
        site: String,

        /// Shared defaults file, TOML or JSON (default: built-in preset defaults)
        #[arg(long)]
        shared: Option<PathBuf>,

        /// Site override file, TOML or JSON
        #[arg(long = "override", short = 'o')]
        overrides: Option<PathBuf>,

        /// Write the configuration to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Include site id, mode and layer provenance in the output
        #[arg(long)]
        provenance: bool,
    },

    /// Compose and validate every site in every mode
    Verify,
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let mode = cli.mode.unwrap_or_else(current_mode);
    let sites = load_sites(cli.sites);

    match cli.command {
        Commands::Sites { json } => run_sites(&sites, json),
        Commands::Resolve { site, json } => run_resolve(&sites, &site, mode, json),
        Commands::InterSite => run_inter_site(&sites, mode),
        Commands::Link { site, path } => run_link(&sites, &site, &path, mode),
        Commands::Compose {
            site,
            shared,
            overrides,
            output,
            provenance,
        } => run_compose(&sites, &site, mode, shared, overrides, output, provenance),
        Commands::Verify => run_verify(&sites),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_sites(path: Option<PathBuf>) -> LoadedSites {
    match path {
        Some(path) => match SitesFile::load(&path) {
            Ok(loaded) => loaded,
            Err(e) => {
                eprintln!("Error loading sites file: {}", e);
                process::exit(1);
            }
        },
        None => LoadedSites {
            registry: SiteRegistry::builtin().clone(),
            origins: Origins::default(),
        },
    }
}

fn resolver(sites: &LoadedSites) -> UrlResolver<'_> {
    UrlResolver::new(&sites.registry).with_origins(sites.origins.clone())
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

fn run_sites(sites: &LoadedSites, json_output: bool) {
    if json_output {
        let output: Vec<_> = sites.registry.all().map(|(_, site)| site).collect();
        print_json(&output);
        return;
    }

    println!("Registered sites ({} total):\n", sites.registry.len());
    for (key, site) in sites.registry.all() {
        println!("  {} ({})", key, site.base_url());
        println!("    Dev server: http://localhost:{}", site.port);
    }
}

fn run_resolve(sites: &LoadedSites, site: &str, mode: DeploymentMode, json_output: bool) {
    let resolved = match resolver(sites).resolve(site, mode) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if json_output {
        print_json(&resolved);
    } else {
        println!("Mode: {}", mode);
        println!("  url: {}", resolved.url);
        println!("  baseUrl: {}", resolved.base_url);
    }
}

fn run_inter_site(sites: &LoadedSites, mode: DeploymentMode) {
    print_json(&resolver(sites).resolve_all(mode));
}

fn run_link(sites: &LoadedSites, site: &str, path: &str, mode: DeploymentMode) {
    match resolver(sites).site_url(site, path, mode) {
        Ok(url) => println!("{}", url),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_compose(
    sites: &LoadedSites,
    site: &str,
    mode: DeploymentMode,
    shared: Option<PathBuf>,
    overrides: Option<PathBuf>,
    output: Option<PathBuf>,
    provenance: bool,
) {
    let composer = ConfigComposer::new(&sites.registry, mode).with_origins(sites.origins.clone());

    let configuration = match composer.compose_files(site, shared.as_deref(), overrides.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error composing configuration for '{}': {}", site, e);
            process::exit(1);
        }
    };

    if let Some(path) = output {
        if let Err(e) = configuration.write_to_file(&path) {
            eprintln!("Error writing {}: {}", path.display(), e);
            process::exit(1);
        }
        eprintln!("Wrote: {}", path.display());
    } else if provenance {
        print_json(&configuration);
    } else {
        print_json(&configuration.config);
    }
}

fn run_verify(sites: &LoadedSites) {
    let shared = SharedDefaults::default().to_value();
    let empty = serde_json::json!({});
    let mut checked = 0;

    for mode in DeploymentMode::ALL {
        let composer = ConfigComposer::new(&sites.registry, mode).with_origins(sites.origins.clone());

        for key in sites.registry.keys() {
            let configuration = match composer.compose(key, &shared, &empty) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("FAIL {} ({}): {}", key, mode, e);
                    process::exit(1);
                }
            };

            // Every inter-site link must agree with the resolved site root
            for (other, link) in configuration.inter_site().into_iter().flatten() {
                let expected = match composer.resolver().resolve(other, mode) {
                    Ok(r) => r.root(),
                    Err(e) => {
                        eprintln!("FAIL {} ({}): {}", key, mode, e);
                        process::exit(1);
                    }
                };
                if link.as_str() != Some(expected.as_str()) {
                    eprintln!(
                        "FAIL {} ({}): interSite.{} is {}, expected {}",
                        key, mode, other, link, expected
                    );
                    process::exit(1);
                }
            }
            checked += 1;
        }
    }

    println!(
        "All {} site configurations valid ({} sites x {} modes)",
        checked,
        sites.registry.len(),
        DeploymentMode::ALL.len()
    );
}
