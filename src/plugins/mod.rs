//! Plugin directory lookup and project build settings.
//!
//! The resolver only needs two questions answered: where a named plugin lives on disk, and
//! where the project keeps its installed plugins. Both are modelled as injected values so
//! callers can back them with a scanned registry, a fixed map or a test double.

mod registry;
mod settings;

use std::io;
use std::path::{Path, PathBuf};

pub use registry::{PluginRegistry, plugin_base_name};
pub use settings::{BuildSettings, DEFAULT_PLUGINS_DIR};

/// Location of an installed plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginDir {
  /// Plugin expanded into a directory tree.
  Directory(PathBuf),
  /// Plugin still packaged as an archive; it has no directory on disk.
  Archive(PathBuf),
}

impl PluginDir {
  /// Path the plugin was registered with.
  pub fn path(&self) -> &Path {
    match self {
      Self::Directory(path) | Self::Archive(path) => path,
    }
  }

  /// Absolute filesystem directory of the plugin.
  ///
  /// Archives cannot be addressed as directories and always fail with
  /// [`io::ErrorKind::Unsupported`].
  pub fn absolute_path(&self) -> io::Result<PathBuf> {
    match self {
      Self::Directory(path) => std::path::absolute(path),
      Self::Archive(path) => Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("plugin archive {} has no directory on disk", path.display()),
      )),
    }
  }
}

/// Lookup of plugin directories by plugin name.
pub trait PluginDirectories: Send + Sync {
  /// Returns the directory for `name`, or `None` when no such plugin is installed.
  fn plugin_dir_for_name(&self, name: &str) -> Option<PluginDir>;
}
