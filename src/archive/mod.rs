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

//! Adapter around the external `7za` extractor.

use crate::diagnostics::{run_captured, write_fail_log};
use crate::error::{RbinstallError, Result};
use crate::platform::user::CurrentUser;
use crate::rbenv::RbenvEnv;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const EXTRACTOR_BINARY: &str = "7za";

pub struct Extractor<'a> {
    binary: PathBuf,
    env: &'a RbenvEnv,
    fail_log_dir: &'a Path,
    user: &'a CurrentUser,
}

impl<'a> Extractor<'a> {
    /// Locate `7za` on `PATH`.
    pub fn locate(env: &'a RbenvEnv, fail_log_dir: &'a Path, user: &'a CurrentUser) -> Result<Self> {
        let binary = which::which(EXTRACTOR_BINARY).map_err(|_| RbinstallError::MissingDependency {
            dependency: EXTRACTOR_BINARY.to_string(),
            reason: "unpacking Ruby archives".to_string(),
        })?;
        Ok(Self::with_binary(binary, env, fail_log_dir, user))
    }

    pub fn with_binary(
        binary: PathBuf,
        env: &'a RbenvEnv,
        fail_log_dir: &'a Path,
        user: &'a CurrentUser,
    ) -> Self {
        Self {
            binary,
            env,
            fail_log_dir,
            user,
        }
    }

    /// Unpack `archive` into `destination`.
    ///
    /// On failure the extractor's output is saved to the fail log and its
    /// path is carried by the returned error.
    pub fn extract(&self, archive: &Path, destination: &Path) -> Result<()> {
        fs::create_dir_all(destination)?;
        debug!(
            "Extracting {} into {}",
            archive.display(),
            destination.display()
        );

        let mut command = Command::new(&self.binary);
        command
            .arg("x")
            .arg("-y")
            .arg(format!("-o{}", destination.display()))
            .arg(archive);
        self.env.apply(&mut command);

        let captured = run_captured(&mut command).map_err(|e| RbinstallError::Extract {
            message: format!("can't run {}: {e}", self.binary.display()),
            log_path: None,
        })?;

        if captured.success() {
            return Ok(());
        }

        Err(RbinstallError::Extract {
            log_path: write_fail_log(self.fail_log_dir, &captured.output, self.user),
            message: captured.output,
        })
    }
}
