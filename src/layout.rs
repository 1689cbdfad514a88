//! Conventional prefixes that separate the deployed layout from the project layout.

/// Prefix under which deployment descriptors and compiled application resources live.
pub const WEB_INF: &str = "/WEB-INF";
/// Project directory holding static web content.
pub const WEB_APP_DIR: &str = "web-app";
/// Leading segment of plugin resources beneath the web-descriptor prefix.
pub const PLUGINS_PREFIX: &str = "plugins/";

/// Owned description of the prefixes used while rewriting resource locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLayout {
  /// Web-descriptor prefix, always starting with `/` and without a trailing slash.
  pub web_inf_prefix: String,
  /// Directory that static resources are served from during development.
  pub web_app_dir: String,
  /// Segment that marks a plugin resource, including its trailing slash.
  pub plugins_prefix: String,
}

impl Default for ResourceLayout {
  fn default() -> Self {
    Self {
      web_inf_prefix: WEB_INF.into(),
      web_app_dir: WEB_APP_DIR.into(),
      plugins_prefix: PLUGINS_PREFIX.into(),
    }
  }
}

impl ResourceLayout {
  /// Build a layout, normalising the separators around each prefix.
  pub fn new(web_inf_prefix: &str, web_app_dir: &str, plugins_prefix: &str) -> Self {
    let web_inf = web_inf_prefix.replace('\\', "/");
    let plugins = plugins_prefix.replace('\\', "/");
    Self {
      web_inf_prefix: format!("/{}", web_inf.trim_matches('/')),
      web_app_dir: web_app_dir.replace('\\', "/").trim_end_matches('/').to_string(),
      plugins_prefix: format!("{}/", plugins.trim_matches('/')),
    }
  }

  /// Return the part of `location` below the web-descriptor prefix.
  ///
  /// Matching is segment aware: `/WEB-INF/x` and `/WEB-INF` match, `/WEB-INFO/x` does not.
  /// The separating slash is not part of the returned remainder.
  pub fn strip_web_inf<'l>(&self, location: &'l str) -> Option<&'l str> {
    let rest = location.strip_prefix(self.web_inf_prefix.as_str())?;
    if rest.is_empty() {
      return Some(rest);
    }
    rest.strip_prefix('/')
  }

  /// Location served from the web application directory.
  pub fn web_app_location(&self, normalized: &str) -> String {
    format!("{}{}", self.web_app_dir, normalized)
  }

  /// Split a web-descriptor remainder such as `plugins/core-1.0/views/a.gsp` into the
  /// plugin name and the path inside the plugin.
  ///
  /// The inner path is empty when the remainder stops at the plugin name.
  pub fn split_plugin_path<'l>(&self, remainder: &'l str) -> Option<(&'l str, &'l str)> {
    let plugin_path = remainder.strip_prefix(self.plugins_prefix.as_str())?;
    Some(match plugin_path.split_once('/') {
      Some((name, rest)) => (name, rest),
      None => (plugin_path, ""),
    })
  }
}

/// Ensure a location starts with a single leading separator.
pub fn normalize_location(location: &str) -> String {
  if location.starts_with('/') {
    location.to_string()
  } else {
    format!("/{location}")
  }
}
