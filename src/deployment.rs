//! Sources for the "running from a packaged artifact" flag.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::MetadataError;

/// Default name of the application metadata file in a project root.
pub const DEFAULT_METADATA_FILE: &str = "application.properties";

const WAR_DEPLOYED: &str = "grails.war.deployed";
const APP_NAME: &str = "app.name";
const APP_VERSION: &str = "app.version";
const GRAILS_VERSION: &str = "app.grails.version";

/// Reports whether the application is running from a packaged deployment.
///
/// Queried on every resolution, so implementations may change their answer at runtime.
pub trait DeploymentMode: Send + Sync {
  /// Returns `true` when resources must be served from the deployed layout.
  fn is_war_deployed(&self) -> bool;
}

impl DeploymentMode for bool {
  fn is_war_deployed(&self) -> bool {
    *self
  }
}

/// Key/value application metadata read from a Java-style properties file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppMetadata {
  properties: BTreeMap<String, String>,
}

impl AppMetadata {
  /// Load metadata from `path`. A missing file produces empty metadata.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, MetadataError> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
      Ok(contents) => Ok(Self::parse(&contents)),
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
        tracing::debug!("no application metadata at {}", path.display());
        Ok(Self::default())
      }
      Err(err) => Err(MetadataError::Io {
        path: path.to_path_buf(),
        source: err,
      }),
    }
  }

  /// Parse `key=value` / `key:value` lines, skipping blanks and `#`/`!` comments.
  pub fn parse(contents: &str) -> Self {
    let properties = contents
      .lines()
      .map(str::trim)
      .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
      .filter_map(|line| {
        let split = line.find(['=', ':'])?;
        let key = line[..split].trim();
        let value = line[split + 1..].trim();
        (!key.is_empty()).then(|| (key.to_string(), value.to_string()))
      })
      .collect();
    Self { properties }
  }

  /// Raw property lookup.
  pub fn get(&self, key: &str) -> Option<&str> {
    self.properties.get(key).map(String::as_str)
  }

  /// Set a property, returning the previous value.
  pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
    self.properties.insert(key.into(), value.into())
  }

  /// Application name (`app.name`).
  pub fn app_name(&self) -> Option<&str> {
    self.get(APP_NAME)
  }

  /// Application version (`app.version`).
  pub fn app_version(&self) -> Option<&str> {
    self.get(APP_VERSION)
  }

  /// Framework version the application was built against.
  pub fn grails_version(&self) -> Option<&str> {
    self.get(GRAILS_VERSION)
  }
}

impl DeploymentMode for AppMetadata {
  fn is_war_deployed(&self) -> bool {
    self
      .get(WAR_DEPLOYED)
      .is_some_and(|value| value.eq_ignore_ascii_case("true"))
  }
}
