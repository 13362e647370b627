// Copyright 2025 rbinstall contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::{RbinstallError, Result};
use crate::platform::permissions::{is_executable_dir, is_writable_dir};
use config::{Config, Environment, File, FileFormat};
use log::debug;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/rbinstall.toml";
pub const CONFIG_PATH_ENV: &str = "RBINSTALL_CONFIG";
const ENV_PREFIX: &str = "RBINSTALL";

const DEFAULT_TMP_DIR: &str = "/tmp";
const DEFAULT_RBENV_DIR: &str = "/usr/local/rbenv";
const DEFAULT_GEMS_SOURCE: &str = "rubygems.org";
const DEFAULT_RUBYGEMS_VERSION: &str = "latest";
const DEFAULT_LOG_PERMS: &str = "0644";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RbinstallConfig {
    #[serde(default)]
    pub main: MainConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub proxy: ProxyConfig,

    #[serde(default)]
    pub rbenv: RbenvConfig,

    #[serde(default)]
    pub gems: GemsConfig,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainConfig {
    #[serde(rename = "tmp-dir", alias = "tmp_dir", default = "default_tmp_dir")]
    pub tmp_dir: PathBuf,
}

impl Default for MainConfig {
    fn default() -> Self {
        Self {
            tmp_dir: default_tmp_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProxyConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RbenvConfig {
    #[serde(default = "default_rbenv_dir")]
    pub dir: PathBuf,

    #[serde(rename = "allow-overwrite", alias = "allow_overwrite", default = "default_true")]
    pub allow_overwrite: bool,

    #[serde(rename = "allow-uninstall", alias = "allow_uninstall", default = "default_true")]
    pub allow_uninstall: bool,

    #[serde(rename = "make-alias", alias = "make_alias", default)]
    pub make_alias: bool,
}

impl Default for RbenvConfig {
    fn default() -> Self {
        Self {
            dir: default_rbenv_dir(),
            allow_overwrite: true,
            allow_uninstall: true,
            make_alias: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GemsConfig {
    #[serde(rename = "rubygems-update", alias = "rubygems_update", default)]
    pub rubygems_update: bool,

    #[serde(
        rename = "rubygems-version",
        alias = "rubygems_version",
        default = "default_rubygems_version"
    )]
    pub rubygems_version: String,

    #[serde(rename = "allow-update", alias = "allow_update", default)]
    pub allow_update: bool,

    #[serde(rename = "no-document", alias = "no_document", default)]
    pub no_document: bool,

    #[serde(default = "default_gems_source")]
    pub source: String,

    #[serde(rename = "source-secure", alias = "source_secure", default)]
    pub source_secure: bool,

    /// Space-separated list of gems installed into every new version
    #[serde(default)]
    pub install: String,
}

impl Default for GemsConfig {
    fn default() -> Self {
        Self {
            rubygems_update: false,
            rubygems_version: default_rubygems_version(),
            allow_update: false,
            no_document: false,
            source: default_gems_source(),
            source_secure: false,
            install: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,

    #[serde(default)]
    pub file: Option<String>,

    #[serde(default = "default_log_perms")]
    pub perms: String,

    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: None,
            file: None,
            perms: default_log_perms(),
            level: default_log_level(),
        }
    }
}

fn default_tmp_dir() -> PathBuf {
    PathBuf::from(DEFAULT_TMP_DIR)
}

fn default_rbenv_dir() -> PathBuf {
    PathBuf::from(DEFAULT_RBENV_DIR)
}

fn default_true() -> bool {
    true
}

fn default_rubygems_version() -> String {
    DEFAULT_RUBYGEMS_VERSION.to_string()
}

fn default_gems_source() -> String {
    DEFAULT_GEMS_SOURCE.to_string()
}

fn default_log_perms() -> String {
    DEFAULT_LOG_PERMS.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl RbinstallConfig {
    /// Load configuration from `RBINSTALL_CONFIG` or the default location.
    pub fn load() -> Result<Self> {
        let path = env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RbinstallError::ConfigError(format!(
                "Configuration file {} does not exist",
                path.display()
            )));
        }

        if std::fs::File::open(path).is_err() {
            return Err(RbinstallError::ConfigError(format!(
                "Configuration file {} is not readable",
                path.display()
            )));
        }

        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(true))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: RbinstallConfig = settings.try_deserialize()?;

        debug!("Loaded config from {path:?}");
        Ok(config)
    }

    /// Check every option that has a validity constraint.
    pub fn validate(&self) -> Result<()> {
        let tmp_dir = &self.main.tmp_dir;
        if !tmp_dir.is_dir() {
            return Err(RbinstallError::InvalidConfig(format!(
                "main:tmp-dir {} is not a directory",
                tmp_dir.display()
            )));
        }

        if !is_writable_dir(tmp_dir) || !is_executable_dir(tmp_dir) {
            return Err(RbinstallError::InvalidConfig(format!(
                "main:tmp-dir {} must be writable and executable",
                tmp_dir.display()
            )));
        }

        if self.storage.url.trim().is_empty() {
            return Err(RbinstallError::InvalidConfig(
                "storage:url can't be empty".to_string(),
            ));
        }

        if self.rbenv.dir.as_os_str().is_empty() {
            return Err(RbinstallError::InvalidConfig(
                "rbenv:dir can't be empty".to_string(),
            ));
        }

        if let Some(proxy) = self.proxy_url() {
            url::Url::parse(proxy).map_err(|_| RbinstallError::InvalidProxy(proxy.to_string()))?;
        }

        self.log_perms()?;

        Ok(())
    }

    /// Storage root without a trailing slash
    pub fn storage_url(&self) -> &str {
        self.storage.url.trim_end_matches('/')
    }

    /// Proxy URL when the proxy is enabled and configured
    pub fn proxy_url(&self) -> Option<&str> {
        if self.proxy.enabled && !self.proxy.url.trim().is_empty() {
            Some(self.proxy.url.trim())
        } else {
            None
        }
    }

    /// Gems installed into every freshly installed version, in order.
    pub fn gems_to_install(&self) -> Vec<String> {
        self.gems
            .install
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    /// RubyGems version used for self-update
    pub fn rubygems_version(&self) -> &str {
        let version = self.gems.rubygems_version.trim();
        if version.is_empty() {
            DEFAULT_RUBYGEMS_VERSION
        } else {
            version
        }
    }

    /// URL passed to `gem --source`, or `None` when no source host is set.
    pub fn gem_source_url(&self, insecure: bool) -> Option<String> {
        let host = self.gems.source.trim();
        if host.is_empty() {
            return None;
        }

        let host = host
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');

        if self.gems.source_secure && !insecure {
            Some(format!("https://{host}"))
        } else {
            Some(format!("http://{host}"))
        }
    }

    /// Log file mode parsed from the octal `log:perms` value
    pub fn log_perms(&self) -> Result<u32> {
        u32::from_str_radix(self.log.perms.trim(), 8).map_err(|_| {
            RbinstallError::InvalidConfig(format!(
                "log:perms '{}' is not a valid octal mode",
                self.log.perms
            ))
        })
    }

    /// Full path of the log file when logging to a file is configured
    pub fn log_file_path(&self) -> Option<PathBuf> {
        match (&self.log.dir, &self.log.file) {
            (Some(dir), Some(file)) if !file.trim().is_empty() => Some(dir.join(file.trim())),
            (None, Some(file)) if !file.trim().is_empty() => Some(PathBuf::from(file.trim())),
            _ => None,
        }
    }
}
