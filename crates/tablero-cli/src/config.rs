// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tablero_app::Role;

const CONFIG_VERSION: i64 = 1;
const DEFAULT_ROLE: &str = "editor";
const DEFAULT_LATENCY_MS: u64 = 400;
const DEFAULT_JITTER_MS: u64 = 200;
const DEFAULT_ERROR_RATE: f64 = 0.1;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub session: Session,
    #[serde(default)]
    pub data: Data,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            storage: Storage::default(),
            session: Session::default(),
            data: Data::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub role: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            role: Some(DEFAULT_ROLE.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Data {
    pub latency_ms: Option<u64>,
    pub jitter_ms: Option<u64>,
    pub error_rate: Option<f64>,
}

impl Default for Data {
    fn default() -> Self {
        Self {
            latency_ms: Some(DEFAULT_LATENCY_MS),
            jitter_ms: Some(DEFAULT_JITTER_MS),
            error_rate: Some(DEFAULT_ERROR_RATE),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("TABLERO_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set TABLERO_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(tablero_db::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and place values under [storage], [session], and [data]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.version != CONFIG_VERSION {
            bail!(
                "config {} has version {}; expected 1",
                path.display(),
                self.version
            );
        }

        if let Some(db_path) = &self.storage.db_path {
            tablero_db::validate_db_path(db_path)?;
        }

        if let Some(role) = &self.session.role
            && Role::parse(role).is_none()
        {
            bail!(
                "session.role in {} must be \"editor\" or \"viewer\", got {:?}",
                path.display(),
                role
            );
        }

        if let Some(rate) = self.data.error_rate
            && !(0.0..=1.0).contains(&rate)
        {
            bail!(
                "data.error_rate in {} must be between 0.0 and 1.0, got {}",
                path.display(),
                rate
            );
        }

        Ok(())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => tablero_db::default_db_path(),
        }
    }

    pub fn role(&self) -> Role {
        self.session
            .role
            .as_deref()
            .and_then(Role::parse)
            .unwrap_or(Role::Editor)
    }

    pub fn data_latency(&self) -> Duration {
        Duration::from_millis(self.data.latency_ms.unwrap_or(DEFAULT_LATENCY_MS))
    }

    pub fn data_jitter(&self) -> Duration {
        Duration::from_millis(self.data.jitter_ms.unwrap_or(DEFAULT_JITTER_MS))
    }

    pub fn data_error_rate(&self) -> f64 {
        self.data.error_rate.unwrap_or(DEFAULT_ERROR_RATE)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# tablero config\n# Place this file at: {}\n\nversion = 1\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/tablero/tablero.db)\n# db_path = \"/absolute/path/to/tablero.db\"\n\n[session]\n# \"editor\" may change dashboards; \"viewer\" only looks at them.\nrole = \"{DEFAULT_ROLE}\"\n\n[data]\n# Simulated metric service tuning.\nlatency_ms = {DEFAULT_LATENCY_MS}\njitter_ms = {DEFAULT_JITTER_MS}\nerror_rate = {DEFAULT_ERROR_RATE}\n",
            path.display(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use anyhow::Result;
    use std::path::PathBuf;
    use tablero_app::Role;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.role(), Role::Editor);
        assert_eq!(config.data_error_rate(), 0.1);
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[session]\nrole = \"viewer\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[storage]\ndb_path = \"/tmp/tablero-test.db\"\n[session]\nrole = \"viewer\"\n[data]\nlatency_ms = 0\njitter_ms = 0\nerror_rate = 0.0\n",
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.role(), Role::Viewer);
        assert_eq!(config.db_path()?, PathBuf::from("/tmp/tablero-test.db"));
        assert!(config.data_latency().is_zero());
        assert_eq!(config.data_error_rate(), 0.0);
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn invalid_role_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[session]\nrole = \"admin\"\n")?;
        let error = Config::load(&path).expect_err("bad role should fail");
        assert!(error.to_string().contains("session.role"));
        Ok(())
    }

    #[test]
    fn out_of_range_error_rate_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[data]\nerror_rate = 1.5\n")?;
        let error = Config::load(&path).expect_err("bad rate should fail");
        assert!(error.to_string().contains("data.error_rate"));
        Ok(())
    }

    #[test]
    fn uri_db_path_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[storage]\ndb_path = \"file:x.db\"\n")?;
        let error = Config::load(&path).expect_err("uri path should fail");
        assert!(error.to_string().contains("file:"));
        Ok(())
    }

    #[test]
    fn example_config_round_trips_through_load() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, Config::example_config(&path))?;

        let config = Config::load(&path)?;
        assert_eq!(config.role(), Role::Editor);
        Ok(())
    }
}
