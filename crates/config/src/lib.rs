#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for stackgc
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/stackgc/config.toml)
//! - Environment variables
//! - CLI flags (applied by the binary)

pub mod constants;
pub mod core;

pub use core::{AwsConfig, GcConfig, GeneralConfig};

use serde::{Deserialize, Serialize};
use stackgc_errors::{ConfigError, Error};
use stackgc_types::{AssetPolicy, ColorChoice, ListingMode, OutputFormat, StackStatus};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub aws: AwsConfig,

    #[serde(default)]
    pub gc: GcConfig,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join(constants::APP_DIR).join(constants::CONFIG_FILE))
    }

    /// Directory for debug log files
    #[must_use]
    pub fn logs_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(constants::APP_DIR)
            .join(constants::LOGS_SUBDIR)
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.display().to_string(),
                }
                .into()
            } else {
                Error::io_with_path(&e, path)
            }
        })?;

        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this schema.
    pub fn from_toml(contents: &str) -> Result<Self, Error> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            tracing::debug!(path = %config_path.display(), "loading config file");
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// If path is provided, loads from that file (which must exist).
    /// If path is None, uses the default loading behavior.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        self.merge_env_from(|name| std::env::var(name).ok())
    }

    /// Merge values from an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds a value that cannot be parsed.
    pub fn merge_env_from<F>(&mut self, lookup: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        use constants::env;

        if let Some(region) = lookup(env::REGION) {
            self.aws.region = Some(region);
        }

        if let Some(profile) = lookup(env::PROFILE) {
            self.aws.profile = Some(profile);
        }

        if let Some(output) = lookup(env::OUTPUT) {
            self.general.default_output = match output.as_str() {
                "plain" => OutputFormat::Plain,
                "tty" => OutputFormat::Tty,
                "json" => OutputFormat::Json,
                _ => return Err(invalid_value(env::OUTPUT, output)),
            };
        }

        if let Some(color) = lookup(env::COLOR) {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => return Err(invalid_value(env::COLOR, color)),
            };
        }

        if let Some(mode) = lookup(env::LISTING_MODE) {
            self.gc.listing_mode = mode
                .parse::<ListingMode>()
                .map_err(|_| invalid_value(env::LISTING_MODE, mode))?;
        }

        if let Some(flag) = lookup(env::REMOVE_TEMPLATES) {
            self.gc.remove_templates = match flag.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => return Err(invalid_value(env::REMOVE_TEMPLATES, flag)),
            };
        }

        Ok(())
    }

    /// Check cross-field constraints after all layers are merged
    ///
    /// # Errors
    ///
    /// Returns an error naming the first offending field.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(region) = &self.aws.region {
            if region.trim().is_empty() {
                return Err(invalid_value("aws.region", region.clone()));
            }
        }

        for (field, extension) in [
            ("gc.bundle_extension", &self.gc.bundle_extension),
            ("gc.template_extension", &self.gc.template_extension),
        ] {
            if extension.len() < 2 || !extension.starts_with('.') {
                return Err(invalid_value(field, extension.clone()));
            }
        }

        if self.gc.bundle_extension == self.gc.template_extension {
            return Err(ConfigError::Invalid {
                message: "bundle and template extensions must differ".to_string(),
            }
            .into());
        }

        if self.gc.marker_parameter.trim().is_empty() {
            return Err(invalid_value(
                "gc.marker_parameter",
                self.gc.marker_parameter.clone(),
            ));
        }

        if self.gc.stack_statuses.is_empty() {
            return Err(ConfigError::Invalid {
                message: "gc.stack_statuses must name at least one status".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Target region
    ///
    /// # Errors
    ///
    /// Returns an error if no layer supplied a region.
    pub fn region(&self) -> Result<&str, Error> {
        self.aws.region.as_deref().ok_or_else(|| {
            ConfigError::MissingField {
                field: "region".to_string(),
            }
            .into()
        })
    }

    /// File-type filter for the reconciler
    #[must_use]
    pub fn asset_policy(&self) -> AssetPolicy {
        AssetPolicy {
            bundle_extension: self.gc.bundle_extension.clone(),
            template_extension: self.gc.template_extension.clone(),
            remove_templates: self.gc.remove_templates,
        }
    }

    /// Status filter for the stack listing
    #[must_use]
    pub fn stack_statuses(&self) -> Vec<StackStatus> {
        self.gc
            .stack_statuses
            .iter()
            .map(|status| StackStatus::new(status.as_str()))
            .collect()
    }
}

fn invalid_value(field: &str, value: String) -> Error {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_are_valid_and_dry() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.gc.listing_mode, ListingMode::Versions);
        assert!(!config.gc.remove_templates);
        assert_eq!(config.gc.marker_parameter, "BootstrapVersion");
        assert_eq!(
            config.stack_statuses(),
            vec![
                StackStatus::new("CREATE_COMPLETE"),
                StackStatus::new("UPDATE_COMPLETE")
            ]
        );
        assert!(config.region().is_err());
    }

    #[test]
    fn env_layer_overrides_file_values() {
        let mut config = Config::from_toml("[aws]\nregion = \"eu-west-1\"\n").unwrap();
        config
            .merge_env_from(lookup(&[
                ("STACKGC_REGION", "us-east-1"),
                ("STACKGC_PROFILE", "ci"),
                ("STACKGC_LISTING_MODE", "auto"),
                ("STACKGC_REMOVE_TEMPLATES", "yes"),
            ]))
            .unwrap();

        assert_eq!(config.region().unwrap(), "us-east-1");
        assert_eq!(config.aws.profile.as_deref(), Some("ci"));
        assert_eq!(config.gc.listing_mode, ListingMode::Auto);
        assert!(config.asset_policy().remove_templates);
    }

    #[test]
    fn invalid_env_values_are_rejected() {
        let mut config = Config::default();
        assert!(config
            .merge_env_from(lookup(&[("STACKGC_LISTING_MODE", "everything")]))
            .is_err());
        assert!(config
            .merge_env_from(lookup(&[("STACKGC_REMOVE_TEMPLATES", "maybe")]))
            .is_err());
    }

    #[test]
    fn validate_rejects_bad_extensions() {
        let mut config = Config::default();
        config.gc.template_extension = ".zip".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.gc.bundle_extension = "zip".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.gc.stack_statuses.clear();
        assert!(config.validate().is_err());
    }
}
