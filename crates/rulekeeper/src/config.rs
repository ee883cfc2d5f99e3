//! Profile configuration.
//!
//! Connection settings are grouped into named profiles. Configuration is
//! loaded with the following precedence (highest to lowest):
//! 1. Environment variables (prefixed with `RULEKEEPER_`)
//! 2. Local config file (`./rulekeeper.toml`)
//! 3. XDG config file (`~/.config/rulekeeper/config.toml`)
//!
//! Example config file:
//! ```toml
//! [profiles.main]
//! token = "ghp_..."
//! org_name = "my-org"
//! repo_name = "my-repo"          # optional, for repository-scoped rulesets
//! allow_repo_privacy_changes = false
//! ```
//!
//! Unlike a dynamic key/value lookup, the whole file is deserialized into
//! [`Settings`] up front, so a malformed configuration fails at load time
//! rather than on first use.

use std::collections::HashMap;
use std::path::PathBuf;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while resolving configuration.
///
/// These are never converted into reconciliation outcomes; callers get them
/// back as `Err` immediately.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("profile '{0}' not found in configuration")]
    ProfileNotFound(String),

    #[error(
        "cannot determine ruleset scope: repository rulesets need an owner and a \
         repository name, organization rulesets need an organization name"
    )]
    UnresolvedScope,

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Named connection profiles.
    pub profiles: HashMap<String, Profile>,
}

/// A named bundle of GitHub connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    /// GitHub API token used for the `Authorization` header.
    pub token: String,
    /// Default organization. Also used as the repository owner when no
    /// explicit owner is given.
    #[serde(default)]
    pub org_name: Option<String>,
    /// Default repository for repository-scoped rulesets.
    #[serde(default)]
    pub repo_name: Option<String>,
    /// Whether operations through this profile may change repository privacy.
    #[serde(default)]
    pub allow_repo_privacy_changes: bool,
}

impl Settings {
    /// Load configuration from config files and the environment.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. XDG config file (`~/.config/rulekeeper/config.toml`)
    /// 2. Local config file (`./rulekeeper.toml`)
    /// 3. Environment variables with the `RULEKEEPER_` prefix
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path() {
            if xdg_config.exists() {
                tracing::debug!("loading config from {:?}", xdg_config);
                builder = builder.add_source(
                    File::from(xdg_config)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        let local_config = PathBuf::from("rulekeeper.toml");
        if local_config.exists() {
            tracing::debug!("loading config from ./rulekeeper.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("RULEKEEPER")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder.build()?.try_deserialize::<Settings>()?;
        Ok(settings)
    }

    /// Parse settings from a TOML string.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let settings = ConfigBuilder::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize::<Settings>()?;
        Ok(settings)
    }

    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "rulekeeper").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_have_no_profiles() {
        let settings = Settings::default();
        assert!(settings.profiles.is_empty());
    }

    #[test]
    fn parses_full_profile() {
        let settings = Settings::from_toml_str(
            r#"
            [profiles.main]
            token = "ghp_test123"
            org_name = "acme"
            repo_name = "widgets"
            allow_repo_privacy_changes = true
        "#,
        )
        .unwrap();

        let profile = settings.profile("main").unwrap();
        assert_eq!(profile.token, "ghp_test123");
        assert_eq!(profile.org_name.as_deref(), Some("acme"));
        assert_eq!(profile.repo_name.as_deref(), Some("widgets"));
        assert!(profile.allow_repo_privacy_changes);
    }

    #[test]
    fn optional_profile_fields_default() {
        let settings = Settings::from_toml_str(
            r#"
            [profiles.minimal]
            token = "ghp_minimal"
        "#,
        )
        .unwrap();

        let profile = settings.profile("minimal").unwrap();
        assert_eq!(profile.token, "ghp_minimal");
        assert!(profile.org_name.is_none());
        assert!(profile.repo_name.is_none());
        assert!(!profile.allow_repo_privacy_changes);
    }

    #[test]
    fn missing_profile_is_a_config_error() {
        let settings = Settings::from_toml_str(
            r#"
            [profiles.main]
            token = "ghp_test123"
        "#,
        )
        .unwrap();

        let err = settings.profile("absent").unwrap_err();
        assert!(matches!(err, ConfigError::ProfileNotFound(name) if name == "absent"));
    }

    #[test]
    fn profile_without_token_fails_at_load() {
        let err = Settings::from_toml_str(
            r#"
            [profiles.broken]
            org_name = "acme"
        "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn invalid_toml_fails_at_load() {
        let err = Settings::from_toml_str(
            r#"
            [profiles.main
            token = "x"
        "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn multiple_profiles_are_independent() {
        let settings = Settings::from_toml_str(
            r#"
            [profiles.org_wide]
            token = "ghp_org"
            org_name = "acme"

            [profiles.repo_only]
            token = "ghp_repo"
            org_name = "acme"
            repo_name = "widgets"
        "#,
        )
        .unwrap();

        assert!(settings.profile("org_wide").unwrap().repo_name.is_none());
        assert_eq!(
            settings.profile("repo_only").unwrap().repo_name.as_deref(),
            Some("widgets")
        );
    }
}
