//! Resource handles and the loaders that turn location strings into them.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::resolver::DevelopmentResourceResolver;

const CLASSPATH_PREFIX: &str = "classpath:";
const FILE_PREFIX: &str = "file:";

fn url_scheme() -> &'static Regex {
  use std::sync::OnceLock;

  // Two characters minimum so Windows drive letters are not mistaken for schemes.
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]+:").expect("invalid url scheme regex"))
}

/// A loadable resource identified by a location string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
  /// File addressed through a `file:` location.
  File(PathBuf),
  /// Resource bundled on the application classpath; not readable from disk.
  Classpath(String),
  /// Any other URL; not fetched by this crate.
  Url(String),
  /// Plain path resolved against the loader root.
  Relative(PathBuf),
}

impl Resource {
  /// Filesystem path of the resource, when it has one.
  pub fn file(&self) -> io::Result<PathBuf> {
    match self {
      Self::File(path) | Self::Relative(path) => Ok(path.clone()),
      Self::Classpath(location) | Self::Url(location) => Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("{location} cannot be resolved to a file"),
      )),
    }
  }

  /// Returns `true` when the resource is a file or directory on disk.
  pub fn exists(&self) -> bool {
    self.file().is_ok_and(|path| path.exists())
  }

  /// Read the resource contents as UTF-8.
  pub fn read_to_string(&self) -> io::Result<String> {
    fs::read_to_string(self.file()?)
  }
}

/// Turns location strings into [`Resource`] handles.
pub trait ResourceLoader {
  /// Resource for `location`. Lookup itself never fails; access may.
  fn get_resource(&self, location: &str) -> Resource;
}

/// Loader that interprets locations literally.
#[derive(Debug, Clone)]
pub struct DefaultResourceLoader {
  root: PathBuf,
}

impl DefaultResourceLoader {
  /// Loader resolving plain paths against `root`.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Directory plain paths are resolved against.
  pub fn root(&self) -> &Path {
    &self.root
  }
}

impl Default for DefaultResourceLoader {
  fn default() -> Self {
    Self::new(".")
  }
}

impl ResourceLoader for DefaultResourceLoader {
  fn get_resource(&self, location: &str) -> Resource {
    if let Some(path) = location.strip_prefix(CLASSPATH_PREFIX) {
      return Resource::Classpath(path.trim_start_matches('/').to_string());
    }
    if let Some(path) = location.strip_prefix(FILE_PREFIX) {
      return Resource::File(PathBuf::from(path));
    }
    if url_scheme().is_match(location) {
      return Resource::Url(location.to_string());
    }
    Resource::Relative(self.root.join(location.trim_start_matches('/')))
  }
}

/// Loader that serves deployment-time locations from a project's source tree.
#[derive(Debug)]
pub struct DevelopmentResourceLoader<'a> {
  inner: DefaultResourceLoader,
  resolver: DevelopmentResourceResolver<'a>,
}

impl<'a> DevelopmentResourceLoader<'a> {
  /// Loader resolving rewritten locations through `inner`.
  pub fn new(inner: DefaultResourceLoader, resolver: DevelopmentResourceResolver<'a>) -> Self {
    Self { inner, resolver }
  }

  /// Resolver applied before delegating to the inner loader.
  pub fn resolver(&self) -> &DevelopmentResourceResolver<'a> {
    &self.resolver
  }
}

impl ResourceLoader for DevelopmentResourceLoader<'_> {
  fn get_resource(&self, location: &str) -> Resource {
    if self.resolver.is_deployed() {
      return self.inner.get_resource(location);
    }
    let resolved = self.resolver.real_location_in_project(location);
    self.inner.get_resource(&resolved)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::plugins::{PluginDir, PluginRegistry};
  use tempfile::tempdir;

  #[test]
  fn default_loader_recognises_location_kinds() {
    let loader = DefaultResourceLoader::new("/srv/app");
    assert_eq!(
      loader.get_resource("classpath:/messages.properties"),
      Resource::Classpath("messages.properties".into())
    );
    assert_eq!(
      loader.get_resource("file:/tmp/a.gsp"),
      Resource::File(PathBuf::from("/tmp/a.gsp"))
    );
    assert_eq!(
      loader.get_resource("https://example.com/a.css"),
      Resource::Url("https://example.com/a.css".into())
    );
    assert_eq!(
      loader.get_resource("/css/main.css"),
      Resource::Relative(PathBuf::from("/srv/app/css/main.css"))
    );
    assert_eq!(
      loader.get_resource("C:/styles/a.css"),
      Resource::Relative(PathBuf::from("/srv/app/C:/styles/a.css"))
    );
  }

  #[test]
  fn classpath_resources_are_not_files() {
    let resource = Resource::Classpath("a.xml".into());
    assert_eq!(resource.file().unwrap_err().kind(), io::ErrorKind::Unsupported);
    assert!(!resource.exists());
    assert!(resource.read_to_string().is_err());
  }

  #[test]
  fn development_loader_reads_project_files() -> io::Result<()> {
    let temp = tempdir()?;
    let project = temp.path();
    fs::create_dir_all(project.join("grails-app/views"))?;
    fs::write(project.join("grails-app/views/foo.gsp"), "<p>dev</p>")?;
    fs::create_dir_all(project.join("web-app/css"))?;
    fs::write(project.join("web-app/css/main.css"), "body{}")?;
    fs::create_dir_all(project.join("vendor/core-1.0/views"))?;
    fs::write(project.join("vendor/core-1.0/views/bar.gsp"), "<p>plugin</p>")?;

    let base = project.to_string_lossy().to_string();
    let mut plugins = PluginRegistry::new();
    plugins.insert("core-1.0", PluginDir::Directory(project.join("vendor/core-1.0")));
    let resolver = DevelopmentResourceResolver::new(&false)
      .with_base_location(&base)
      .with_plugins(&plugins);
    let loader = DevelopmentResourceLoader::new(DefaultResourceLoader::new(project), resolver);

    let view = loader.get_resource("/WEB-INF/grails-app/views/foo.gsp");
    assert_eq!(view, Resource::File(project.join("grails-app/views/foo.gsp")));
    assert_eq!(view.read_to_string()?, "<p>dev</p>");

    let css = loader.get_resource("css/main.css");
    assert_eq!(css, Resource::Relative(project.join("web-app/css/main.css")));
    assert!(css.exists());

    let plugin_view = loader.get_resource("/WEB-INF/plugins/core-1.0/views/bar.gsp");
    assert_eq!(plugin_view.read_to_string()?, "<p>plugin</p>");
    Ok(())
  }

  #[test]
  fn deployed_loader_passes_locations_through() {
    let resolver = DevelopmentResourceResolver::new(&true);
    let loader = DevelopmentResourceLoader::new(DefaultResourceLoader::new("/srv/app"), resolver);
    assert_eq!(
      loader.get_resource("/WEB-INF/grails-app/views/foo.gsp"),
      Resource::Relative(PathBuf::from("/srv/app/WEB-INF/grails-app/views/foo.gsp"))
    );
    assert!(loader.resolver().is_deployed());
  }
}
