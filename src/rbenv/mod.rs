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

//! The rbenv versions tree: layout, installed state, promotion, aliases and
//! shim rehashing.

mod env;

pub use env::RbenvEnv;

use crate::config::RbenvConfig;
use crate::diagnostics::run_captured;
use crate::error::{RbinstallError, Result};
use crate::platform::permissions::{is_executable_dir, is_readable_executable, is_writable_dir};
use log::{debug, info};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const VERSIONS_DIR: &str = "versions";
pub const UNPACK_DIR: &str = ".rbinstall";
const PATCH_ZERO: &str = "-p0";

pub struct Rbenv {
    root: PathBuf,
    allow_overwrite: bool,
    allow_uninstall: bool,
    make_alias: bool,
    env: RbenvEnv,
}

impl Rbenv {
    pub fn new(config: &RbenvConfig, env: RbenvEnv) -> Self {
        Self {
            root: config.dir.clone(),
            allow_overwrite: config.allow_overwrite,
            allow_uninstall: config.allow_uninstall,
            make_alias: config.make_alias,
            env,
        }
    }

    pub fn env(&self) -> &RbenvEnv {
        &self.env
    }

    pub fn allow_overwrite(&self) -> bool {
        self.allow_overwrite
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.root.join(VERSIONS_DIR)
    }

    pub fn version_path(&self, name: &str) -> PathBuf {
        self.versions_dir().join(name)
    }

    /// Hidden staging directory archives are unpacked into
    pub fn unpack_dir(&self) -> PathBuf {
        self.versions_dir().join(UNPACK_DIR)
    }

    fn entry_point(&self) -> PathBuf {
        self.root.join("libexec").join("rbenv")
    }

    pub fn is_installed(&self, name: &str) -> bool {
        fs::symlink_metadata(self.version_path(name)).is_ok()
    }

    /// Names of every directory under `versions`, staging excluded.
    pub fn installed_set(&self) -> Result<BTreeSet<String>> {
        let mut names = BTreeSet::new();

        let entries = match fs::read_dir(self.versions_dir()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || !entry.path().is_dir() {
                continue;
            }
            names.insert(name);
        }

        Ok(names)
    }

    /// Check the versions tree can be written and rbenv itself is runnable.
    pub fn preflight(&self) -> Result<()> {
        let versions = self.versions_dir();
        if !is_writable_dir(&versions) || !is_executable_dir(&versions) {
            return Err(RbinstallError::VersionsDirNotWritable(
                versions.display().to_string(),
            ));
        }

        let entry_point = self.entry_point();
        if !is_readable_executable(&entry_point) {
            return Err(RbinstallError::RbenvNotFound {
                path: entry_point.display().to_string(),
            });
        }

        Ok(())
    }

    /// Make sure the staging directory exists and holds nothing for `name`.
    pub fn prepare_staging(&self, name: &str) -> Result<PathBuf> {
        let unpack_dir = self.unpack_dir();
        fs::create_dir_all(&unpack_dir)?;
        self.clean_staging(name)?;
        Ok(unpack_dir)
    }

    pub fn clean_staging(&self, name: &str) -> Result<()> {
        remove_if_exists(&self.unpack_dir().join(name))
    }

    /// Move `<staging>/<name>` into the versions tree.
    ///
    /// An existing installation is replaced only when `reinstall` is requested
    /// and overwriting is allowed.
    pub fn promote(&self, name: &str, reinstall: bool) -> Result<PathBuf> {
        let staged = self.unpack_dir().join(name);
        let target = self.version_path(name);

        if fs::symlink_metadata(&target).is_ok() {
            if !(reinstall && self.allow_overwrite) {
                return Err(RbinstallError::Promotion(format!(
                    "{} already exists",
                    target.display()
                )));
            }
            debug!("Removing previous installation {}", target.display());
            remove_if_exists(&target)
                .map_err(|e| RbinstallError::Promotion(format!("{}: {e}", target.display())))?;
        }

        fs::rename(&staged, &target).map_err(|e| {
            RbinstallError::Promotion(format!(
                "{} -> {}: {e}",
                staged.display(),
                target.display()
            ))
        })?;

        Ok(target)
    }

    /// Remove an installed version together with its `-p0` alias.
    pub fn uninstall(&self, name: &str) -> Result<()> {
        if !self.allow_uninstall {
            return Err(RbinstallError::UninstallNotAllowed);
        }
        if !self.is_installed(name) {
            return Err(RbinstallError::NotInstalled(name.to_string()));
        }

        if let Some(alias) = alias_name(name) {
            let alias_path = self.version_path(&alias);
            if fs::symlink_metadata(&alias_path).is_ok_and(|m| m.file_type().is_symlink()) {
                fs::remove_file(&alias_path)?;
            }
        }

        remove_if_exists(&self.version_path(name))
    }

    /// Link `<name-without-"-p0">` to `name` when aliasing is enabled.
    ///
    /// Returns the alias name when a link was created.
    pub fn make_alias(&self, name: &str) -> Result<Option<String>> {
        if !self.make_alias {
            return Ok(None);
        }
        let Some(alias) = alias_name(name) else {
            return Ok(None);
        };

        let alias_path = self.version_path(&alias);
        if fs::symlink_metadata(&alias_path).is_ok() {
            debug!("Alias {alias} already exists");
            return Ok(None);
        }

        symlink(&self.version_path(name), &alias_path)?;
        Ok(Some(alias))
    }

    pub fn rehash(&self) -> Result<()> {
        let mut command = Command::new(self.entry_point());
        command.arg("rehash");
        self.env.apply(&mut command);

        let captured = run_captured(&mut command).map_err(|e| RbinstallError::Rehash {
            output: e.to_string(),
        })?;
        if !captured.success() {
            return Err(RbinstallError::Rehash {
                output: captured.output.trim().to_string(),
            });
        }

        info!("Rehashed");
        Ok(())
    }
}

/// Alias for a patch-level zero name: `2.0.0-p0` becomes `2.0.0`.
pub fn alias_name(name: &str) -> Option<String> {
    if name.contains(PATCH_ZERO) {
        Some(name.replacen(PATCH_ZERO, "", 1))
    } else {
        None
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported",
    ))
}

#[cfg(test)]
mod tests;
