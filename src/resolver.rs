//! Rewrites deployment-time resource locations into their development-time equivalents.

use crate::deployment::DeploymentMode;
use crate::layout::{ResourceLayout, normalize_location};
use crate::plugins::{BuildSettings, PluginDirectories};

/// Base location used for non-plugin `WEB-INF` resources when none is configured.
pub const DEFAULT_BASE_LOCATION: &str = ".";

const FILE_SCHEME: &str = "file:";

/// Maps `/WEB-INF/...` locations onto a project's source tree while it is run in place.
///
/// A deployed application serves every location unchanged. Otherwise:
///
/// * locations outside `/WEB-INF` are served from the web application directory,
/// * `/WEB-INF/<path>` maps to `file:<base>/<path>`,
/// * `/WEB-INF/plugins/<name>/<path>` maps into the plugin's own directory when the plugin
///   lookup or the build settings know where it lives.
#[derive(Clone, Copy)]
pub struct DevelopmentResourceResolver<'a> {
  deployment: &'a dyn DeploymentMode,
  base_location: &'a str,
  plugins: Option<&'a dyn PluginDirectories>,
  build_settings: Option<&'a BuildSettings>,
  layout: Option<&'a ResourceLayout>,
}

impl<'a> DevelopmentResourceResolver<'a> {
  /// Resolver with the default base location and no plugin collaborators.
  pub fn new(deployment: &'a dyn DeploymentMode) -> Self {
    Self {
      deployment,
      base_location: DEFAULT_BASE_LOCATION,
      plugins: None,
      build_settings: None,
      layout: None,
    }
  }

  /// Directory prefix for non-plugin `WEB-INF` resources.
  pub fn with_base_location(mut self, base_location: &'a str) -> Self {
    self.base_location = base_location;
    self
  }

  /// Plugin lookup consulted for `WEB-INF/plugins/...` locations.
  pub fn with_plugins(mut self, plugins: &'a dyn PluginDirectories) -> Self {
    self.plugins = Some(plugins);
    self
  }

  /// Build settings used for plugins the lookup does not know about.
  pub fn with_build_settings(mut self, build_settings: &'a BuildSettings) -> Self {
    self.build_settings = Some(build_settings);
    self
  }

  /// Prefixes to match instead of the conventional `/WEB-INF`, `web-app` and `plugins/`.
  pub fn with_layout(mut self, layout: &'a ResourceLayout) -> Self {
    self.layout = Some(layout);
    self
  }

  /// Directory prefix used for non-plugin `WEB-INF` resources.
  pub fn base_location(&self) -> &str {
    self.base_location
  }

  /// Whether locations are currently served from the deployed layout.
  pub fn is_deployed(&self) -> bool {
    self.deployment.is_war_deployed()
  }

  /// Resolve `location`, leaving it untouched when the application is deployed.
  pub fn resolve(&self, location: &str) -> String {
    if self.is_deployed() {
      return location.to_string();
    }
    self.real_location_in_project(location)
  }

  /// Development-time location of a resource requested at its deployment-time `location`.
  ///
  /// Ignores the deployment flag; use [`Self::resolve`] to honour it.
  pub fn real_location_in_project(&self, location: &str) -> String {
    let default_layout;
    let layout = match self.layout {
      Some(layout) => layout,
      None => {
        default_layout = ResourceLayout::default();
        &default_layout
      }
    };

    let location = normalize_location(location);
    let Some(remainder) = layout.strip_web_inf(&location) else {
      let resolved = layout.web_app_location(&location);
      tracing::debug!("{location} -> {resolved} (web application resource)");
      return resolved;
    };

    let default_path = format!("{FILE_SCHEME}{}/{remainder}", self.base_location);
    let Some((plugin_name, inner_path)) = layout.split_plugin_path(remainder) else {
      tracing::debug!("{location} -> {default_path}");
      return default_path;
    };

    if let Some(plugin_dir) = self
      .plugins
      .and_then(|plugins| plugins.plugin_dir_for_name(plugin_name))
    {
      return match plugin_dir.absolute_path() {
        Ok(dir) => {
          let resolved = format!("{FILE_SCHEME}{}/{inner_path}", dir.display());
          tracing::debug!("{location} -> {resolved} (plugin {plugin_name})");
          resolved
        }
        Err(err) => {
          // TODO: surface this once callers can handle a failed resolution.
          tracing::warn!(
            "cannot resolve directory of plugin {plugin_name} at {}: {err}; using {default_path}",
            plugin_dir.path().display()
          );
          default_path
        }
      };
    }

    if let Some(settings) = self.build_settings {
      let resolved = format!(
        "{FILE_SCHEME}{}/{plugin_name}/{inner_path}",
        settings.project_plugins_dir_absolute().display()
      );
      tracing::debug!("{location} -> {resolved} (project plugins dir)");
      return resolved;
    }

    tracing::debug!("{location} -> {default_path} (unknown plugin {plugin_name})");
    default_path
  }
}

impl std::fmt::Debug for DevelopmentResourceResolver<'_> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("DevelopmentResourceResolver")
      .field("deployed", &self.is_deployed())
      .field("base_location", &self.base_location)
      .field("plugins", &self.plugins.is_some())
      .field("build_settings", &self.build_settings)
      .field("layout", &self.layout)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::plugins::{PluginDir, PluginRegistry};
  use std::path::PathBuf;
  use std::sync::atomic::{AtomicBool, Ordering};

  struct Toggle(AtomicBool);

  impl DeploymentMode for Toggle {
    fn is_war_deployed(&self) -> bool {
      self.0.load(Ordering::SeqCst)
    }
  }

  fn registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.insert(
      "core-1.0",
      PluginDir::Directory(PathBuf::from("/opt/plugins/core-1.0")),
    );
    registry.insert(
      "packed-2.0",
      PluginDir::Archive(PathBuf::from("/opt/plugins/packed-2.0.zip")),
    );
    registry
  }

  #[test]
  fn deployed_locations_are_untouched() {
    let resolver = DevelopmentResourceResolver::new(&true);
    for location in [
      "",
      "css/main.css",
      "/WEB-INF/grails-app/views/foo.gsp",
      "/WEB-INF/plugins/core-1.0/views/bar.gsp",
    ] {
      assert_eq!(resolver.resolve(location), location);
    }
  }

  #[test]
  fn deployment_flag_is_read_per_call() {
    let toggle = Toggle(AtomicBool::new(true));
    let resolver = DevelopmentResourceResolver::new(&toggle);
    assert_eq!(resolver.resolve("/css/a.css"), "/css/a.css");

    toggle.0.store(false, Ordering::SeqCst);
    assert_eq!(resolver.resolve("/css/a.css"), "web-app/css/a.css");
  }

  #[test]
  fn non_web_inf_locations_map_to_web_app() {
    let resolver = DevelopmentResourceResolver::new(&false);
    assert_eq!(resolver.resolve("/css/main.css"), "web-app/css/main.css");
    assert_eq!(
      resolver.resolve("grails-app/views/foo.gsp"),
      "web-app/grails-app/views/foo.gsp"
    );
    assert_eq!(resolver.resolve("/WEB-INFO/x.xml"), "web-app/WEB-INFO/x.xml");
  }

  #[test]
  fn web_inf_locations_map_under_base_location() {
    let resolver = DevelopmentResourceResolver::new(&false);
    assert_eq!(
      resolver.resolve("/WEB-INF/grails-app/views/foo.gsp"),
      "file:./grails-app/views/foo.gsp"
    );
    assert_eq!(
      resolver.resolve("WEB-INF/grails-app/i18n/messages.properties"),
      "file:./grails-app/i18n/messages.properties"
    );

    let resolver = resolver.with_base_location("/work/shop");
    assert_eq!(
      resolver.resolve("/WEB-INF/grails-app/views/foo.gsp"),
      "file:/work/shop/grails-app/views/foo.gsp"
    );
    assert_eq!(resolver.resolve("/WEB-INF"), "file:/work/shop/");
  }

  #[test]
  fn registered_plugins_map_into_their_directory() {
    let plugins = registry();
    let resolver = DevelopmentResourceResolver::new(&false).with_plugins(&plugins);
    assert_eq!(
      resolver.resolve("/WEB-INF/plugins/core-1.0/views/bar.gsp"),
      "file:/opt/plugins/core-1.0/views/bar.gsp"
    );
    assert_eq!(
      resolver.resolve("/WEB-INF/plugins/core/views/bar.gsp"),
      "file:/opt/plugins/core-1.0/views/bar.gsp"
    );
    assert_eq!(
      resolver.resolve("/WEB-INF/plugins/core-1.0"),
      "file:/opt/plugins/core-1.0/"
    );
  }

  #[test]
  fn unresolvable_plugin_directories_fall_back_to_default() {
    let plugins = registry();
    let settings = BuildSettings::new("/work/shop");
    let resolver = DevelopmentResourceResolver::new(&false)
      .with_plugins(&plugins)
      .with_build_settings(&settings);
    assert_eq!(
      resolver.resolve("/WEB-INF/plugins/packed-2.0/views/a.gsp"),
      "file:./plugins/packed-2.0/views/a.gsp"
    );
  }

  #[test]
  fn unknown_plugins_use_project_plugins_dir() {
    let plugins = registry();
    let settings = BuildSettings::new("/work/shop");
    let resolver = DevelopmentResourceResolver::new(&false)
      .with_plugins(&plugins)
      .with_build_settings(&settings);
    assert_eq!(
      resolver.resolve("/WEB-INF/plugins/mail-1.0/views/a.gsp"),
      "file:/work/shop/plugins/mail-1.0/views/a.gsp"
    );

    let resolver = DevelopmentResourceResolver::new(&false).with_build_settings(&settings);
    assert_eq!(
      resolver.resolve("/WEB-INF/plugins/core-1.0/views/bar.gsp"),
      "file:/work/shop/plugins/core-1.0/views/bar.gsp"
    );
  }

  #[test]
  fn unknown_plugins_without_settings_use_default() {
    let plugins = registry();
    let resolver = DevelopmentResourceResolver::new(&false).with_plugins(&plugins);
    assert_eq!(
      resolver.resolve("/WEB-INF/plugins/mail-1.0/views/a.gsp"),
      "file:./plugins/mail-1.0/views/a.gsp"
    );

    let bare = DevelopmentResourceResolver::new(&false);
    assert_eq!(
      bare.resolve("/WEB-INF/plugins/core-1.0/views/bar.gsp"),
      "file:./plugins/core-1.0/views/bar.gsp"
    );
  }

  #[test]
  fn custom_layout_changes_prefixes() {
    let layout = ResourceLayout::new("/META-INF", "static", "extensions/");
    let plugins = registry();
    let resolver = DevelopmentResourceResolver::new(&false)
      .with_layout(&layout)
      .with_plugins(&plugins);

    assert_eq!(resolver.resolve("/css/a.css"), "static/css/a.css");
    assert_eq!(
      resolver.resolve("/META-INF/extensions/core-1.0/a.gsp"),
      "file:/opt/plugins/core-1.0/a.gsp"
    );
    assert_eq!(
      resolver.resolve("/WEB-INF/plugins/core-1.0/a.gsp"),
      "static/WEB-INF/plugins/core-1.0/a.gsp"
    );
  }

  #[test]
  fn real_location_ignores_deployment_flag() {
    let resolver = DevelopmentResourceResolver::new(&true);
    assert_eq!(resolver.resolve("/css/a.css"), "/css/a.css");
    assert_eq!(resolver.real_location_in_project("/css/a.css"), "web-app/css/a.css");
  }
}
