//! YAML configuration for the `misty` command line.
//!
//! The default file lives at `~/.config/misty/misty.yml`:
//!
//! ```yaml
//! addr: 10.0.1.5
//! username: admin
//! password: hunter2
//! retries: 3
//! retry_delay_ms: 3000
//! request_rate: 100
//! request_burst: 15
//! request_timeout_ms: 5000
//! ```
//!
//! Only `addr` is required.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::{ClientOptions, MistyClient, MistyError, Result};

/// Location of the config file relative to the home directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/misty/misty.yml";

/// Returns `~/.config/misty/misty.yml`.
pub fn default_config_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_CONFIG_PATH))
        .ok_or(MistyError::NoHomeDir)
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Robot address, with or without scheme.
    pub addr: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub retries: Option<usize>,
    #[serde(default)]
    pub retry_delay_ms: Option<u64>,
    #[serde(default)]
    pub request_rate: Option<f64>,
    #[serde(default)]
    pub request_burst: Option<u32>,
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

impl Config {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Client options with unset fields taken from [`ClientOptions::default`].
    pub fn client_options(&self) -> ClientOptions {
        let defaults = ClientOptions::default();
        ClientOptions {
            retries: self.retries.unwrap_or(defaults.retries),
            retry_delay: self
                .retry_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry_delay),
            request_rate: self.request_rate.unwrap_or(defaults.request_rate),
            request_burst: self.request_burst.unwrap_or(defaults.request_burst),
            request_timeout: self
                .request_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_timeout),
        }
    }

    /// Builds a client for [`Config::addr`].
    pub fn client(&self) -> Result<MistyClient> {
        let mut client = MistyClient::from_addr(&self.addr)?.with_options(self.client_options());
        if let Some(username) = &self.username {
            client = client.with_basic_auth(username, self.password.clone().unwrap_or_default());
        }
        if let Some(user_agent) = &self.user_agent {
            client = client.with_user_agent(user_agent);
        }
        Ok(client)
    }
}

/// A config together with the file it was read from.
#[derive(Clone, Debug)]
pub struct ConfigFile {
    path: PathBuf,
    config: Config,
}

impl ConfigFile {
    /// Reads `path`, or the default path when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => default_config_path()?,
        };
        let config = read(&path)?;
        Ok(Self { path, config })
    }

    /// Reads the same file again, keeping the previous config on failure.
    pub fn reload(&mut self) -> Result<()> {
        self.config = read(&self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

fn read(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|source| MistyError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    Config::from_yaml_str(&content)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;

    use super::{Config, ConfigFile};
    use crate::{ClientOptions, MistyError};

    fn scratch_file(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("misty-config-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("temp dir must be writable");
        let path = dir.join(name);
        fs::write(&path, content).expect("temp file must be writable");
        path
    }

    #[test]
    fn minimal_config_uses_default_options() {
        let config = Config::from_yaml_str("addr: 10.0.1.5\n").expect("config must parse");
        assert_eq!(config.addr, "10.0.1.5");
        assert_eq!(config.client_options(), ClientOptions::default());
    }

    #[test]
    fn tunables_override_defaults() {
        let config = Config::from_yaml_str(
            "addr: http://robot/\nretries: 5\nretry_delay_ms: 10\nrequest_rate: 2.5\nrequest_burst: 1\nrequest_timeout_ms: 200\n",
        )
        .expect("config must parse");
        let options = config.client_options();
        assert_eq!(options.retries, 5);
        assert_eq!(options.retry_delay, Duration::from_millis(10));
        assert_eq!(options.request_rate, 2.5);
        assert_eq!(options.request_burst, 1);
        assert_eq!(options.request_timeout, Duration::from_millis(200));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = Config::from_yaml_str("addr: x\nport: 80\n").expect_err("unknown field");
        assert!(matches!(err, MistyError::ConfigParse(_)));
    }

    #[test]
    fn client_normalizes_address() {
        let config = Config {
            addr: "10.0.1.5".to_owned(),
            username: Some("admin".to_owned()),
            ..Config::default()
        };
        let client = config.client().expect("client must build");
        assert_eq!(client.base_url().as_str(), "http://10.0.1.5/");
    }

    #[test]
    fn missing_file_reports_path() {
        let path = std::env::temp_dir().join("misty-config-does-not-exist.yml");
        let err = ConfigFile::load(Some(&path)).expect_err("file is missing");
        match err {
            MistyError::ConfigRead { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("expected config read error, got {other:?}"),
        }
    }

    #[test]
    fn reload_picks_up_changes() {
        let path = scratch_file("reload.yml", "addr: 10.0.1.5\n");
        let mut file = ConfigFile::load(Some(&path)).expect("config must load");
        assert_eq!(file.config().addr, "10.0.1.5");

        fs::write(&path, "addr: 10.0.1.6\n").expect("temp file must be writable");
        file.reload().expect("config must reload");
        assert_eq!(file.config().addr, "10.0.1.6");
        assert_eq!(file.path(), path.as_path());
    }
}
