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

mod context;
mod exit_codes;
mod format;

pub use context::ErrorContext;
pub use exit_codes::get_exit_code;
pub use format::{format_error_chain, format_error_with_color, format_warning};

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RbinstallError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("rbenv is not found at {path}")]
    RbenvNotFound { path: String },

    #[error("Directory {0} must be writable and executable")]
    VersionsDirNotWritable(String),

    #[error("{dependency} is required for {reason}")]
    MissingDependency { dependency: String, reason: String },

    #[error("Architecture {0} is not supported")]
    UnsupportedArchitecture(String),

    #[error("Operating system {0} is not supported")]
    UnsupportedOs(String),

    #[error("Can't parse OS version '{0}'")]
    InvalidOsVersion(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Server returned status code {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Can't parse proxy URL '{0}'")]
    InvalidProxy(String),

    #[error("Can't decode repository index: {0}")]
    InvalidIndex(String),

    #[error("Repository is empty")]
    EmptyRepository,

    #[error("No such version ({name}) for {dist}/{arch}")]
    VersionNotAvailable {
        name: String,
        dist: String,
        arch: String,
    },

    #[error("Version {0} is not installed")]
    NotInstalled(String),

    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("Can't unpack archive{}", log_suffix(.log_path))]
    Extract {
        message: String,
        log_path: Option<PathBuf>,
    },

    #[error("Unpacked binary of {name} doesn't work: {message}")]
    SanityCheck { name: String, message: String },

    #[error("Can't move unpacked data to versions directory: {0}")]
    Promotion(String),

    #[error("Can't install gem {package}{}", log_suffix(.log_path))]
    CannotInstallPackage {
        package: String,
        log_path: Option<PathBuf>,
    },

    #[error("Can't update gem {package}{}", log_suffix(.log_path))]
    CannotUpdatePackage {
        package: String,
        log_path: Option<PathBuf>,
    },

    #[error("Can't update RubyGems{}", log_suffix(.log_path))]
    CannotUpdateRubygems { log_path: Option<PathBuf> },

    #[error("Can't rehash shims: {output}")]
    Rehash { output: String },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Installation canceled by user")]
    Cancelled,

    #[error("Uninstalling is not allowed")]
    UninstallNotAllowed,

    #[error("Reinstalling is not allowed")]
    ReinstallNotAllowed,

    #[error("Gems update is not allowed")]
    GemsUpdateNotAllowed,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] attohttpc::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

impl RbinstallError {
    /// Path of the diagnostics file attached to subprocess failures, if any.
    pub fn log_path(&self) -> Option<&Path> {
        match self {
            RbinstallError::Extract { log_path, .. }
            | RbinstallError::CannotInstallPackage { log_path, .. }
            | RbinstallError::CannotUpdatePackage { log_path, .. }
            | RbinstallError::CannotUpdateRubygems { log_path } => log_path.as_deref(),
            _ => None,
        }
    }
}

fn log_suffix(log_path: &Option<PathBuf>) -> String {
    match log_path {
        Some(path) => format!(". Command output saved as {}", path.display()),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, RbinstallError>;
