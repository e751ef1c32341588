//! Integration tests for config

#[cfg(test)]
mod tests {
    use stackgc_config::*;
    use stackgc_types::{ColorChoice, ListingMode, OutputFormat};
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[general]
default_output = "plain"
color = "never"

[aws]
region = "us-east-1"
profile = "staging"

[gc]
listing_mode = "current"
remove_templates = true
marker_parameter = "AssetsVersion"
stack_statuses = ["CREATE_COMPLETE", "UPDATE_COMPLETE", "UPDATE_ROLLBACK_COMPLETE"]
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.general.default_output, OutputFormat::Plain);
        assert_eq!(config.general.color, ColorChoice::Never);
        assert_eq!(config.region().unwrap(), "us-east-1");
        assert_eq!(config.aws.profile.as_deref(), Some("staging"));
        assert_eq!(config.gc.listing_mode, ListingMode::Current);
        assert!(config.gc.remove_templates);
        assert_eq!(config.gc.marker_parameter, "AssetsVersion");
        assert_eq!(config.stack_statuses().len(), 3);
        // Unset keys keep their defaults
        assert_eq!(config.gc.bundle_extension, ".zip");
        config.validate().unwrap();
    }

    #[tokio::test]
    async fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Config::load_or_default(Some(&missing)).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_toml_is_a_parse_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[gc]\nlisting_mode = \"sometimes\"").unwrap();
        let err = Config::load_from_file(temp_file.path()).await.unwrap_err();
        assert!(err.to_string().contains("parse error"));
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::remove_var("STACKGC_OUTPUT");
        std::env::remove_var("STACKGC_COLOR");

        std::env::set_var("STACKGC_OUTPUT", "json");
        std::env::set_var("STACKGC_COLOR", "always");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert_eq!(config.general.default_output, OutputFormat::Json);
        assert_eq!(config.general.color, ColorChoice::Always);

        std::env::remove_var("STACKGC_OUTPUT");
        std::env::remove_var("STACKGC_COLOR");
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::remove_var("STACKGC_OUTPUT");
        std::env::set_var("STACKGC_OUTPUT", "invalid");

        let mut config = Config::default();
        assert!(config.merge_env().is_err());

        std::env::remove_var("STACKGC_OUTPUT");
    }
}
