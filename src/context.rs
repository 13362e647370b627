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

//! State shared by every command of one installer run.

use crate::config::RbinstallConfig;
use crate::error::Result;
use crate::index::Index;
use crate::platform::Platform;
use crate::platform::user::CurrentUser;
use crate::rbenv::{Rbenv, RbenvEnv};
use crate::signals::CleanupRegistry;
use std::path::Path;
use std::time::Instant;
use tempfile::TempDir;

/// Flags of the current invocation
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub reinstall: bool,
    pub gems_insecure: bool,
    pub all: bool,
    pub no_progress: bool,
    /// Animate a spinner while tasks run
    pub spinner: bool,
}

pub struct Context {
    pub config: RbinstallConfig,
    pub index: Index,
    pub platform: Platform,
    pub user: CurrentUser,
    pub options: RunOptions,
    pub started: Instant,
    pub cleanup: CleanupRegistry,
    temp: TempDir,
    rbenv: Rbenv,
}

impl Context {
    /// Create the run's temporary directory under `main:tmp-dir`.
    pub fn new(
        config: RbinstallConfig,
        index: Index,
        platform: Platform,
        user: CurrentUser,
        options: RunOptions,
        cleanup: CleanupRegistry,
    ) -> Result<Self> {
        let temp = tempfile::Builder::new()
            .prefix("rbinstall-")
            .tempdir_in(&config.main.tmp_dir)?;
        cleanup.register(temp.path());

        let env = RbenvEnv::new(&config.rbenv.dir, config.proxy_url());
        let rbenv = Rbenv::new(&config.rbenv, env);

        Ok(Self {
            config,
            index,
            platform,
            user,
            options,
            started: Instant::now(),
            cleanup,
            temp,
            rbenv,
        })
    }

    /// Replace the environment handed to child processes.
    pub fn with_env(mut self, env: RbenvEnv) -> Self {
        self.rbenv = Rbenv::new(&self.config.rbenv, env);
        self
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp.path()
    }

    pub fn rbenv(&self) -> &Rbenv {
        &self.rbenv
    }

    pub fn env(&self) -> &RbenvEnv {
        self.rbenv.env()
    }

    /// Directory fail logs are written to
    pub fn fail_log_dir(&self) -> &Path {
        &self.config.main.tmp_dir
    }

    pub fn gem_source(&self) -> Option<String> {
        self.config.gem_source_url(self.options.gems_insecure)
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.cleanup.unregister(self.temp.path());
    }
}
