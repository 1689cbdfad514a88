use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs::{self, FileType};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use regex::Regex;
use same_file::is_same_file;

use super::{PluginDir, PluginDirectories};

const ARCHIVE_EXTENSION: &str = "zip";

fn versioned_name() -> &'static Regex {
  use std::sync::OnceLock;

  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r"^(?P<name>.+)-(?P<version>\d+(?:\.\w+)*(?:-[A-Za-z]\w*)?)$")
      .expect("invalid plugin version regex")
  })
}

/// Strip a trailing `-<version>` from an installed plugin name.
///
/// `spring-security-core-1.2.7` becomes `spring-security-core`; names without a version
/// suffix are returned unchanged. Only the final segment is treated as a version, so
/// `oauth-2-provider-1.0` keeps its digit-led inner segment.
pub fn plugin_base_name(name: &str) -> &str {
  versioned_name()
    .captures(name)
    .and_then(|caps| caps.name("name"))
    .map_or(name, |m| m.as_str())
}

/// Ordered map of installed plugins keyed by their installed name (usually `name-version`).
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
  plugins: BTreeMap<String, PluginDir>,
}

impl PluginRegistry {
  /// Create an empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a plugin, replacing and returning any previous entry with the same name.
  pub fn insert(&mut self, name: impl Into<String>, dir: PluginDir) -> Option<PluginDir> {
    self.plugins.insert(name.into(), dir)
  }

  /// Number of registered plugins.
  pub fn len(&self) -> usize {
    self.plugins.len()
  }

  /// Returns `true` when no plugins are registered.
  pub fn is_empty(&self) -> bool {
    self.plugins.is_empty()
  }

  /// Iterate registered plugins in name order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &PluginDir)> {
    self.plugins.iter().map(|(name, dir)| (name.as_str(), dir))
  }

  /// Register every plugin installed in `dir`.
  ///
  /// Subdirectories become [`PluginDir::Directory`] entries and `.zip` files become
  /// [`PluginDir::Archive`] entries named after the file stem. Hidden entries are skipped
  /// and names that are already registered keep their first location. A missing directory
  /// registers nothing. Returns the number of newly registered plugins.
  pub fn scan_dir(&mut self, dir: &Path) -> io::Result<usize> {
    let entries = match fs::read_dir(dir) {
      Ok(entries) => entries,
      Err(err) if err.kind() == ErrorKind::NotFound => {
        tracing::trace!("plugin directory {} does not exist", dir.display());
        return Ok(0);
      }
      Err(err) => return Err(err),
    };

    let mut added = 0;
    for entry in entries {
      let entry = match entry {
        Ok(entry) => entry,
        Err(err) => {
          tracing::warn!("skipping unreadable entry in {}: {err}", dir.display());
          continue;
        }
      };
      let Some((name, plugin)) =
        installed_plugin(&entry.file_name(), entry.path(), entry.file_type())
      else {
        continue;
      };

      if let Some(existing) = self.plugins.get(&name) {
        if is_same_file(existing.path(), plugin.path()).unwrap_or(false) {
          tracing::trace!("plugin {name} already registered at {}", existing.path().display());
        } else {
          tracing::debug!(
            "plugin {name} at {} is shadowed by {}",
            plugin.path().display(),
            existing.path().display()
          );
        }
        continue;
      }

      tracing::trace!("registered plugin {name} at {}", plugin.path().display());
      self.plugins.insert(name, plugin);
      added += 1;
    }

    Ok(added)
  }
}

/// Classify one directory entry as an installed plugin.
///
/// Hidden entries, plain files and entries whose type cannot be read yield `None`.
fn installed_plugin(
  file_name: &OsStr,
  path: PathBuf,
  file_type: io::Result<FileType>,
) -> Option<(String, PluginDir)> {
  let name_str = file_name.to_string_lossy();
  if name_str.starts_with('.') {
    return None;
  }

  let file_type = match file_type {
    Ok(file_type) => file_type,
    Err(err) => {
      tracing::warn!("skipping {}: {err}", path.display());
      return None;
    }
  };

  if file_type.is_dir() {
    return Some((name_str.to_string(), PluginDir::Directory(path)));
  }

  let is_archive = file_type.is_file()
    && path
      .extension()
      .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION));
  if !is_archive {
    return None;
  }
  let stem = path.file_stem()?.to_string_lossy().to_string();
  Some((stem, PluginDir::Archive(path)))
}

impl PluginDirectories for PluginRegistry {
  /// Exact installed names win; otherwise a bare name such as `core` matches versioned
  /// entries (`core-1.0`), picking the last one in name order.
  fn plugin_dir_for_name(&self, name: &str) -> Option<PluginDir> {
    if let Some(dir) = self.plugins.get(name) {
      return Some(dir.clone());
    }

    self
      .plugins
      .iter()
      .rev()
      .find(|(installed, _)| plugin_base_name(installed) == name)
      .map(|(_, dir)| dir.clone())
  }
}
