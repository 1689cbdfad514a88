//! Project configuration loader describing where development resources live.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::deployment::{DEFAULT_METADATA_FILE, DeploymentMode};
use crate::error::ConfigError;
use crate::layout::{PLUGINS_PREFIX, ResourceLayout, WEB_APP_DIR, WEB_INF};
use crate::plugins::{BuildSettings, DEFAULT_PLUGINS_DIR, PluginDir, PluginRegistry};
use crate::resolver::{DEFAULT_BASE_LOCATION, DevelopmentResourceResolver};

/// File name searched for in the project directory.
pub const DEFAULT_CONFIG_FILE: &str = "dev-resources.config.json";

/// Discoverable project configuration describing the development layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
  /// Location prepended to non-plugin `WEB-INF` resources.
  pub base_location: String,
  /// Web-descriptor prefix of the deployed layout.
  pub web_inf_prefix: String,
  /// Directory serving static resources during development.
  pub web_app_dir: String,
  /// Segment marking plugin resources below the web-descriptor prefix.
  pub plugins_prefix: String,
  /// Directory, relative to the project, holding installed plugins.
  pub project_plugins_dir: String,
  /// Additional directories scanned for installed plugins, in priority order.
  pub plugin_search_dirs: Vec<String>,
  /// Explicit plugin locations keyed by plugin name. These take priority over scans.
  pub plugins: BTreeMap<String, String>,
  /// Application metadata file carrying the deployment flag.
  pub metadata_file: String,
}

impl Default for ResolverConfig {
  fn default() -> Self {
    Self {
      base_location: DEFAULT_BASE_LOCATION.into(),
      web_inf_prefix: WEB_INF.into(),
      web_app_dir: WEB_APP_DIR.into(),
      plugins_prefix: PLUGINS_PREFIX.into(),
      project_plugins_dir: DEFAULT_PLUGINS_DIR.into(),
      plugin_search_dirs: Vec::new(),
      plugins: BTreeMap::new(),
      metadata_file: DEFAULT_METADATA_FILE.into(),
    }
  }
}

impl ResolverConfig {
  /// Load configuration from `project_dir`, falling back to defaults when the file is
  /// missing or unreadable.
  pub fn discover(project_dir: &Path) -> Self {
    let candidate = project_dir.join(DEFAULT_CONFIG_FILE);
    match Self::from_path(&candidate) {
      Ok(config) => config,
      Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
        Self::default()
      }
      Err(err) => {
        tracing::warn!("{err}; using default configuration");
        Self::default()
      }
    }
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Borrowing conversion into a layout.
  pub fn to_layout(&self) -> ResourceLayout {
    ResourceLayout::new(&self.web_inf_prefix, &self.web_app_dir, &self.plugins_prefix)
  }

  /// Convert the configuration into a layout, dropping the remaining settings.
  pub fn into_layout(self) -> ResourceLayout {
    self.to_layout()
  }

  /// Build settings for a project rooted at `project_dir`.
  pub fn build_settings(&self, project_dir: &Path) -> BuildSettings {
    BuildSettings::new(project_dir).with_project_plugins_dir(&self.project_plugins_dir)
  }

  /// Path of the metadata file within `project_dir`.
  pub fn metadata_path(&self, project_dir: &Path) -> PathBuf {
    project_dir.join(&self.metadata_file)
  }

  /// Registry of every plugin visible to the project.
  ///
  /// Explicit `plugins` entries come first, then each search directory in order, then the
  /// project plugins directory. Earlier sources shadow later ones.
  pub fn plugin_registry(&self, project_dir: &Path) -> io::Result<PluginRegistry> {
    let mut registry = PluginRegistry::new();
    for (name, dir) in &self.plugins {
      let path = project_dir.join(dir);
      let plugin = if path.is_file() {
        PluginDir::Archive(path)
      } else {
        PluginDir::Directory(path)
      };
      registry.insert(name.clone(), plugin);
    }

    for dir in &self.plugin_search_dirs {
      registry.scan_dir(&project_dir.join(dir))?;
    }
    registry.scan_dir(self.build_settings(project_dir).project_plugins_dir())?;

    tracing::debug!("{} plugins visible from {}", registry.len(), project_dir.display());
    Ok(registry)
  }

  /// Absolute base location for non-plugin `WEB-INF` resources of the project.
  ///
  /// `override_location` takes precedence over the configured value. Relative locations are
  /// taken from `project_dir`, not from the working directory of the process.
  pub fn base_location_in(&self, project_dir: &Path, override_location: Option<&str>) -> String {
    let location = override_location.unwrap_or(self.base_location.as_str());
    let joined: PathBuf = project_dir.join(location).components().collect();
    let absolute = std::path::absolute(&joined).unwrap_or(joined);
    absolute.to_string_lossy().into_owned()
  }

  /// Everything a resolver needs for the project rooted at `project_dir`.
  pub fn project_resources(
    &self,
    project_dir: &Path,
    override_location: Option<&str>,
  ) -> io::Result<ProjectResources> {
    Ok(ProjectResources {
      base_location: self.base_location_in(project_dir, override_location),
      layout: self.to_layout(),
      build_settings: self.build_settings(project_dir),
      plugins: self.plugin_registry(project_dir)?,
    })
  }
}

/// Owned collaborators of a [`DevelopmentResourceResolver`] for one project.
#[derive(Debug, Clone)]
pub struct ProjectResources {
  base_location: String,
  layout: ResourceLayout,
  build_settings: BuildSettings,
  plugins: PluginRegistry,
}

impl ProjectResources {
  /// Resolver borrowing these collaborators.
  pub fn resolver<'a>(
    &'a self,
    deployment: &'a dyn DeploymentMode,
  ) -> DevelopmentResourceResolver<'a> {
    DevelopmentResourceResolver::new(deployment)
      .with_base_location(&self.base_location)
      .with_layout(&self.layout)
      .with_plugins(&self.plugins)
      .with_build_settings(&self.build_settings)
  }

  /// Absolute base location used for non-plugin resources.
  pub fn base_location(&self) -> &str {
    &self.base_location
  }

  /// Plugins visible to the project.
  pub fn plugins(&self) -> &PluginRegistry {
    &self.plugins
  }
}
