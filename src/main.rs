use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use dev_resource_loader::{AppMetadata, DeploymentMode, PluginDir, ResolverConfig};

/// Resolve deployment-time resource locations against a project's source tree
#[derive(Parser)]
#[command(name = "dev-resources")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Log each rewrite decision")]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Print the development-time location of each resource
  Resolve {
    /// Deployment-time locations (e.g. /WEB-INF/grails-app/views/index.gsp)
    #[arg(required = true)]
    locations: Vec<String>,

    #[command(flatten)]
    project: ProjectArgs,

    /// Location prefix for non-plugin WEB-INF resources (overrides the config file)
    #[arg(short = 'b', long = "base-location")]
    base_location: Option<String>,

    /// Treat the application as deployed and print locations unchanged
    #[arg(long = "deployed")]
    deployed: bool,

    /// Print results as JSON
    #[arg(long = "json")]
    json: bool,
  },
  /// List the plugins visible to the project
  Plugins {
    #[command(flatten)]
    project: ProjectArgs,
  },
}

#[derive(Args)]
struct ProjectArgs {
  /// Project root (defaults to the current directory)
  #[arg(short = 'p', long = "project-dir", default_value = ".")]
  project_dir: PathBuf,

  /// Configuration file (defaults to <project-dir>/dev-resources.config.json)
  #[arg(short = 'c', long = "config")]
  config: Option<PathBuf>,
}

impl ProjectArgs {
  fn load_config(&self) -> Result<ResolverConfig> {
    match &self.config {
      Some(path) => ResolverConfig::from_path(path)
        .with_context(|| format!("failed to load configuration {}", path.display())),
      None => Ok(ResolverConfig::discover(&self.project_dir)),
    }
  }
}

#[derive(Serialize)]
struct Resolution<'a> {
  location: &'a str,
  resolved: String,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  match Cli::parse().command {
    Commands::Resolve {
      locations,
      project,
      base_location,
      deployed,
      json,
    } => resolve_command(&locations, &project, base_location, deployed, json),
    Commands::Plugins { project } => plugins_command(&project),
  }
}

fn resolve_command(
  locations: &[String],
  project: &ProjectArgs,
  base_location: Option<String>,
  deployed: bool,
  json: bool,
) -> Result<()> {
  let project_dir = project.project_dir.as_path();
  let config = project.load_config()?;
  let metadata_path = config.metadata_path(project_dir);
  let metadata = AppMetadata::load(&metadata_path)?;
  debug!(
    "project {} (app {}, deployed: {})",
    project_dir.display(),
    metadata.app_name().unwrap_or("unknown"),
    metadata.is_war_deployed()
  );

  let deployment: &dyn DeploymentMode = if deployed { &true } else { &metadata };
  let resources = config
    .project_resources(project_dir, base_location.as_deref())
    .with_context(|| format!("failed to scan plugins for {}", project_dir.display()))?;
  debug!("base location {}", resources.base_location());
  let resolver = resources.resolver(deployment);

  let results: Vec<Resolution> = locations
    .iter()
    .map(|location| Resolution {
      location,
      resolved: resolver.resolve(location),
    })
    .collect();

  if json {
    println!("{}", serde_json::to_string_pretty(&results)?);
  } else {
    for result in &results {
      println!("{}", result.resolved);
    }
  }
  Ok(())
}

fn plugins_command(project: &ProjectArgs) -> Result<()> {
  let project_dir: &Path = &project.project_dir;
  let config = project.load_config()?;
  let plugins = config
    .plugin_registry(project_dir)
    .with_context(|| format!("failed to scan plugins for {}", project_dir.display()))?;

  if plugins.is_empty() {
    println!("No plugins found");
    return Ok(());
  }

  for (name, dir) in plugins.iter() {
    let kind = match dir {
      PluginDir::Directory(_) => "dir",
      PluginDir::Archive(_) => "zip",
    };
    println!("{name:<32} {kind:<4} {}", dir.path().display());
  }
  Ok(())
}
