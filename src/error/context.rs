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

use crate::error::RbinstallError;
use std::fmt;

pub struct ErrorContext<'a> {
    pub error: &'a RbinstallError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl<'a> ErrorContext<'a> {
    pub fn new(error: &'a RbinstallError) -> Self {
        let (suggestion, details) = match error {
            RbinstallError::ConfigError(_) | RbinstallError::Config(_) => (
                Some(
                    "Check that /etc/rbinstall.toml (or the file named by RBINSTALL_CONFIG) \
                     exists and is readable."
                        .to_string(),
                ),
                None,
            ),
            RbinstallError::InvalidConfig(msg) => (
                Some("Fix the configuration file and try again.".to_string()),
                Some(format!("Validation failed: {msg}")),
            ),
            RbinstallError::RbenvNotFound { path } => (
                Some(
                    "Make sure rbenv is installed and 'rbenv:dir' points to its root directory."
                        .to_string(),
                ),
                Some(format!("Expected rbenv entry point at {path}")),
            ),
            RbinstallError::VersionsDirNotWritable(_) => (
                Some("Run rbinstall as root (e.g. with sudo).".to_string()),
                None,
            ),
            RbinstallError::MissingDependency { dependency, .. } => (
                Some(format!("Install {dependency} and make sure it is available in PATH.")),
                None,
            ),
            RbinstallError::UnsupportedArchitecture(_)
            | RbinstallError::UnsupportedOs(_)
            | RbinstallError::InvalidOsVersion(_) => (
                Some(
                    "Prebuilt binaries are only published for Linux on x32, x64 and arm."
                        .to_string(),
                ),
                None,
            ),
            RbinstallError::NetworkError(_) | RbinstallError::Http(_) => (
                Some(
                    "Check your internet connection and proxy settings ('proxy:url').".to_string(),
                ),
                None,
            ),
            RbinstallError::HttpStatus { status, .. } => (
                Some("Check 'storage:url' in the configuration file.".to_string()),
                Some(format!("HTTP status {status}")),
            ),
            RbinstallError::InvalidProxy(_) => (
                Some("Proxy URL must look like http://host:port".to_string()),
                None,
            ),
            RbinstallError::InvalidIndex(_) | RbinstallError::EmptyRepository => (
                Some(
                    "The repository index looks broken. Regenerate it with rbinstall-gen."
                        .to_string(),
                ),
                None,
            ),
            RbinstallError::VersionNotAvailable { .. } => (
                Some("Run 'rbinstall' without arguments to see available versions.".to_string()),
                None,
            ),
            RbinstallError::NotInstalled(name) => (
                Some(format!("Run 'rbinstall {name}' to install it.")),
                None,
            ),
            RbinstallError::ChecksumMismatch { .. } => (
                Some(
                    "Try again. If the problem persists, the file may be corrupted in the \
                     repository."
                        .to_string(),
                ),
                Some(
                    "The downloaded file's checksum doesn't match the value from the index."
                        .to_string(),
                ),
            ),
            RbinstallError::Extract { message, .. } => (
                Some("Ensure you have enough disk space and try again.".to_string()),
                Some(message.clone()),
            ),
            RbinstallError::SanityCheck { .. } => (
                Some(
                    "The binary may be built for another distribution. Check that the \
                     repository matches your OS."
                        .to_string(),
                ),
                None,
            ),
            RbinstallError::Rehash { .. } => (
                Some("Run 'rbenv rehash' manually to see the full output.".to_string()),
                None,
            ),
            RbinstallError::PermissionDenied(_) => (
                Some("Run rbinstall as root (e.g. with sudo).".to_string()),
                None,
            ),
            RbinstallError::UninstallNotAllowed => (
                Some("Set 'rbenv:allow-uninstall' to true to enable it.".to_string()),
                None,
            ),
            RbinstallError::ReinstallNotAllowed => (
                Some("Set 'rbenv:allow-overwrite' to true to enable it.".to_string()),
                None,
            ),
            RbinstallError::GemsUpdateNotAllowed => (
                Some("Set 'gems:allow-update' to true to enable it.".to_string()),
                None,
            ),
            _ => (None, None),
        };

        Self {
            error,
            suggestion,
            details,
        }
    }
}

impl<'a> fmt::Display for ErrorContext<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\n\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}
