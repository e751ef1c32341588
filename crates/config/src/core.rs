//! Configuration sections

use crate::constants;
use serde::{Deserialize, Serialize};
use stackgc_types::{ColorChoice, ListingMode, OutputFormat, StackStatus};

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeneralConfig {
    #[serde(default)]
    pub default_output: OutputFormat,
    #[serde(default)]
    pub color: ColorChoice,
}

/// Provider account selection
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AwsConfig {
    /// Target region; the CLI flag wins over this
    pub region: Option<String>,
    /// Named profile; environment credentials are used when unset
    pub profile: Option<String>,
}

/// Reconciliation policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcConfig {
    #[serde(default)]
    pub listing_mode: ListingMode,
    #[serde(default)]
    pub remove_templates: bool,
    #[serde(default = "default_bundle_extension")]
    pub bundle_extension: String,
    #[serde(default = "default_template_extension")]
    pub template_extension: String,
    #[serde(default = "default_marker_parameter")]
    pub marker_parameter: String,
    #[serde(default = "default_stack_statuses")]
    pub stack_statuses: Vec<String>,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            listing_mode: ListingMode::default(),
            remove_templates: false,
            bundle_extension: default_bundle_extension(),
            template_extension: default_template_extension(),
            marker_parameter: default_marker_parameter(),
            stack_statuses: default_stack_statuses(),
        }
    }
}

// Default value functions for serde
fn default_bundle_extension() -> String {
    constants::DEFAULT_BUNDLE_EXTENSION.to_string()
}

fn default_template_extension() -> String {
    constants::DEFAULT_TEMPLATE_EXTENSION.to_string()
}

fn default_marker_parameter() -> String {
    constants::DEFAULT_MARKER_PARAMETER.to_string()
}

fn default_stack_statuses() -> Vec<String> {
    vec![
        StackStatus::CREATE_COMPLETE.to_string(),
        StackStatus::UPDATE_COMPLETE.to_string(),
    ]
}
