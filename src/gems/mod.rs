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

//! RubyGems operations run inside an installed version.

use crate::config::GemsConfig;
use crate::diagnostics::{CapturedOutput, run_captured, write_fail_log};
use crate::error::{RbinstallError, Result};
use crate::platform::user::CurrentUser;
use crate::rbenv::RbenvEnv;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::SystemTime;

const LATEST: &str = "latest";

pub struct Gems<'a> {
    version_dir: PathBuf,
    config: &'a GemsConfig,
    source: Option<String>,
    env: &'a RbenvEnv,
    fail_log_dir: &'a Path,
    user: &'a CurrentUser,
}

impl<'a> Gems<'a> {
    pub fn new(
        version_dir: PathBuf,
        config: &'a GemsConfig,
        source: Option<String>,
        env: &'a RbenvEnv,
        fail_log_dir: &'a Path,
        user: &'a CurrentUser,
    ) -> Self {
        Self {
            version_dir,
            config,
            source,
            env,
            fail_log_dir,
            user,
        }
    }

    fn gem_binary(&self) -> PathBuf {
        self.version_dir.join("bin").join("gem")
    }

    /// Every `lib/ruby/gems/<abi>/gems` directory of the version
    fn package_dirs(&self) -> Vec<PathBuf> {
        let root = self.version_dir.join("lib").join("ruby").join("gems");
        let Ok(entries) = fs::read_dir(&root) else {
            return Vec::new();
        };

        entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path().join("gems"))
            .filter(|path| path.is_dir())
            .collect()
    }

    fn run(&self, args: &[String]) -> std::io::Result<CapturedOutput> {
        let mut command = Command::new(self.gem_binary());
        command.args(args);
        self.env.apply(&mut command);
        run_captured(&mut command)
    }

    fn source_args(&self, args: &mut Vec<String>) {
        if let Some(source) = &self.source {
            args.push("--source".to_string());
            args.push(source.clone());
        }
    }

    fn document_args(&self, args: &mut Vec<String>) {
        if self.config.no_document {
            args.push("--no-document".to_string());
        }
    }

    /// Run `gem update --system`, optionally pinned to `target`.
    pub fn update_self(&self, target: &str) -> Result<()> {
        let mut args = vec!["update".to_string(), "--system".to_string()];
        if !target.is_empty() && target != LATEST {
            args.push(target.to_string());
        }
        self.source_args(&mut args);

        match self.run(&args) {
            Ok(captured) if captured.success() => Ok(()),
            Ok(captured) => Err(RbinstallError::CannotUpdateRubygems {
                log_path: write_fail_log(self.fail_log_dir, &captured.output, self.user),
            }),
            Err(e) => Err(RbinstallError::CannotUpdateRubygems {
                log_path: write_fail_log(self.fail_log_dir, &e.to_string(), self.user),
            }),
        }
    }

    /// Install `package`, returning the installed version when it can be
    /// determined.
    pub fn install(&self, package: &str) -> Result<String> {
        let since = SystemTime::now();
        let mut args = vec!["install".to_string(), package.to_string()];
        self.document_args(&mut args);
        self.source_args(&mut args);

        let outcome = self.run(&args);
        if let Some(output) = failure_output(outcome) {
            return Err(RbinstallError::CannotInstallPackage {
                package: package.to_string(),
                log_path: write_fail_log(self.fail_log_dir, &output, self.user),
            });
        }

        let version = self.installed_package_version(package, since);
        info!("Installed gem {package} {version}");
        Ok(version)
    }

    /// Update `package`. An empty version means it was already current.
    pub fn update(&self, package: &str) -> Result<String> {
        let since = SystemTime::now();
        let mut args = vec!["update".to_string(), package.to_string()];
        self.document_args(&mut args);
        self.source_args(&mut args);

        let outcome = self.run(&args);
        if let Some(output) = failure_output(outcome) {
            return Err(RbinstallError::CannotUpdatePackage {
                package: package.to_string(),
                log_path: write_fail_log(self.fail_log_dir, &output, self.user),
            });
        }

        let version = self.installed_package_version(package, since);
        if !version.is_empty() {
            info!("Updated gem {package} to {version}");
        }
        Ok(version)
    }

    pub fn is_package_installed(&self, package: &str) -> bool {
        self.package_dirs().iter().any(|dir| {
            fs::read_dir(dir).is_ok_and(|entries| {
                entries.filter_map(|entry| entry.ok()).any(|entry| {
                    package_version(&entry.file_name().to_string_lossy(), package).is_some()
                })
            })
        })
    }

    /// Version suffix of the first `<package>-<version>` directory modified
    /// after `since`, or an empty string.
    pub fn installed_package_version(&self, package: &str, since: SystemTime) -> String {
        for dir in self.package_dirs() {
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.filter_map(|entry| entry.ok()) {
                let name = entry.file_name().to_string_lossy().into_owned();
                let Some(version) = package_version(&name, package) else {
                    continue;
                };
                let modified = entry.metadata().and_then(|m| m.modified());
                if modified.is_ok_and(|modified| modified > since) {
                    debug!("Found {name} in {}", dir.display());
                    return version.to_string();
                }
            }
        }

        String::new()
    }
}

/// `rake-10.4.2` is rake 10.4.2, `rake-compiler-0.9.5` is not rake
fn package_version<'n>(dir_name: &'n str, package: &str) -> Option<&'n str> {
    dir_name
        .strip_prefix(package)?
        .strip_prefix('-')
        .filter(|version| version.starts_with(|c: char| c.is_ascii_digit()))
}

fn failure_output(outcome: std::io::Result<CapturedOutput>) -> Option<String> {
    match outcome {
        Ok(captured) if captured.success() => None,
        Ok(captured) => Some(captured.output),
        Err(e) => Some(e.to_string()),
    }
}
