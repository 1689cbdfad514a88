use std::path::{Path, PathBuf};

/// Project-relative directory that installed plugins are expanded into.
pub const DEFAULT_PLUGINS_DIR: &str = "plugins";

/// Build-time settings the resolver consults when a plugin is not registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
  base_dir: PathBuf,
  project_plugins_dir: PathBuf,
}

impl BuildSettings {
  /// Settings for a project rooted at `base_dir`, with plugins under `base_dir/plugins`.
  pub fn new(base_dir: impl Into<PathBuf>) -> Self {
    let base_dir = base_dir.into();
    let project_plugins_dir = base_dir.join(DEFAULT_PLUGINS_DIR);
    Self {
      base_dir,
      project_plugins_dir,
    }
  }

  /// Override the project plugins directory. Relative paths are taken from the base dir.
  pub fn with_project_plugins_dir(mut self, dir: impl AsRef<Path>) -> Self {
    self.project_plugins_dir = self.base_dir.join(dir);
    self
  }

  /// Project root.
  pub fn base_dir(&self) -> &Path {
    &self.base_dir
  }

  /// Configured project plugins directory, possibly relative.
  pub fn project_plugins_dir(&self) -> &Path {
    &self.project_plugins_dir
  }

  /// Absolute form of the project plugins directory.
  ///
  /// Falls back to the configured path when it cannot be made absolute.
  pub fn project_plugins_dir_absolute(&self) -> PathBuf {
    std::path::absolute(&self.project_plugins_dir)
      .unwrap_or_else(|_| self.project_plugins_dir.clone())
  }
}
