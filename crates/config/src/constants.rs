//! Fixed names and defaults shared by the config layer and the CLI

/// Directory name used under the platform config and data directories
pub const APP_DIR: &str = "stackgc";

pub const CONFIG_FILE: &str = "config.toml";

pub const LOGS_SUBDIR: &str = "logs";

/// Template parameter that marks a stack as following the asset-bootstrap convention
pub const DEFAULT_MARKER_PARAMETER: &str = "BootstrapVersion";

pub const DEFAULT_BUNDLE_EXTENSION: &str = ".zip";
pub const DEFAULT_TEMPLATE_EXTENSION: &str = ".json";

pub mod env {
    pub const REGION: &str = "STACKGC_REGION";
    pub const PROFILE: &str = "STACKGC_PROFILE";
    pub const OUTPUT: &str = "STACKGC_OUTPUT";
    pub const COLOR: &str = "STACKGC_COLOR";
    pub const LISTING_MODE: &str = "STACKGC_LISTING_MODE";
    pub const REMOVE_TEMPLATES: &str = "STACKGC_REMOVE_TEMPLATES";
}
