// Standard Library Imports
use std::{
    env, fs,
    path::{Path, PathBuf},
};

// External Crate Imports
use color_eyre::{
    Result,
    eyre::{WrapErr, eyre},
};
use directories::ProjectDirs;
use serde::Deserialize;
use tracing::{debug, info};

// Local Crate Imports
use crate::access::{AccessLevel, Permissions};

// Public API ==========================================================================================================

#[derive(Clone, Eq, PartialEq, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server_url: String,
    pub page_size: usize,
    pub username: Option<String>,
    pub password: Option<String>,
    pub access: Permissions,
}

impl Config {
    pub const PATH_VARIABLE: &str = "FILES_CONSOLE_CONFIG";

    /// Loads the configuration file named by `FILES_CONSOLE_CONFIG`, falling back to `config.toml` in the platform's
    /// configuration directory, and finally to the defaults if neither exists
    pub fn load() -> Result<Self> {
        if let Some(path) = env::var_os(Self::PATH_VARIABLE) {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(path),
            _ => {
                info!("no configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading configuration");

        let toml = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read configuration from {}", path.display()))?;

        Self::from_toml(&toml).wrap_err_with(|| format!("invalid configuration in {}", path.display()))
    }

    pub fn from_toml(toml: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml)?;
        config.validate()?;

        Ok(config)
    }

    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "files-console").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.username.as_deref().zip(self.password.as_deref())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3000/".to_owned(),
            page_size: 50,
            username: None,
            password: None,
            access: Permissions::new().grant("files", AccessLevel::Write),
        }
    }
}

// Private Helper Code =================================================================================================

impl Config {
    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(eyre!("`page_size` must be at least 1"));
        }

        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            return Err(eyre!(
                "`server_url` must be an http:// or https:// URL, not {:?}",
                self.server_url
            ));
        }

        if self.username.is_some() != self.password.is_some() {
            return Err(eyre!("`username` and `password` must be given together"));
        }

        Ok(())
    }
}

// Unit Tests ==========================================================================================================

#[cfg(test)]
mod tests {
    use std::io::Write;

    use indoc::indoc;
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn from_toml() {
        let config = Config::from_toml(indoc! {r#"
            server_url = "https://acs.example.net/"
            page_size = 20
            username = "admin"
            password = "hunter2"

            [access]
            files = 2
            devices = 3
        "#})
        .unwrap();

        assert_eq!(config.server_url, "https://acs.example.net/");
        assert_eq!(config.page_size, 20);
        assert_eq!(config.credentials(), Some(("admin", "hunter2")));
        assert_eq!(config.access.level("files"), AccessLevel::Read);
        assert_eq!(config.access.level("devices"), AccessLevel::Write);
    }

    #[test]
    fn defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.page_size, 50);
        assert_eq!(config.credentials(), None);
        assert!(config.access.has_access("files", AccessLevel::Write));
    }

    #[test]
    fn invalid() {
        let error = Config::from_toml("page_size = 0").unwrap_err();
        assert_eq!(error.to_string(), "`page_size` must be at least 1");

        let error = Config::from_toml(r#"server_url = "ftp://acs""#).unwrap_err();
        assert_eq!(
            error.to_string(),
            r#"`server_url` must be an http:// or https:// URL, not "ftp://acs""#
        );

        let error = Config::from_toml(r#"username = "admin""#).unwrap_err();
        assert_eq!(
            error.to_string(),
            "`username` and `password` must be given together"
        );

        assert!(Config::from_toml("colour = \"blue\"").is_err());
    }

    #[test]
    fn from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "page_size = 10").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.page_size, 10);

        let missing = Config::from_file("tests/data/does-not-exist.toml").unwrap_err();
        assert_eq!(
            missing.to_string(),
            "failed to read configuration from tests/data/does-not-exist.toml"
        );
    }
}
