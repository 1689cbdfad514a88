#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod deployment;
pub mod error;
pub mod layout;
pub mod plugins;
pub mod resolver;
pub mod resource;

pub use config::{ProjectResources, ResolverConfig};
pub use deployment::{AppMetadata, DeploymentMode};
pub use error::{ConfigError, MetadataError};
pub use layout::ResourceLayout;
pub use plugins::{BuildSettings, PluginDir, PluginDirectories, PluginRegistry};
pub use resolver::DevelopmentResourceResolver;
pub use resource::{DefaultResourceLoader, DevelopmentResourceLoader, Resource, ResourceLoader};
