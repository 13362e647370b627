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

use crate::commands::resolve_version;
use crate::context::Context;
use crate::error::{RbinstallError, Result};
use crate::task::Task;
use colored::Colorize;
use log::{debug, info};

pub struct UninstallCommand<'a> {
    ctx: &'a Context,
}

impl<'a> UninstallCommand<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    pub fn execute(&self, requested: &str) -> Result<String> {
        let ctx = self.ctx;
        let rbenv = ctx.rbenv();

        if !ctx.config.rbenv.allow_uninstall {
            return Err(RbinstallError::UninstallNotAllowed);
        }
        rbenv.preflight()?;

        let name = match resolve_version(ctx, requested) {
            Ok((info, _)) => info.name,
            // Versions dropped from the repository can still be removed
            Err(RbinstallError::VersionNotAvailable { .. }) if rbenv.is_installed(requested) => {
                debug!("{requested} is not in the index, uninstalling by name");
                requested.to_string()
            }
            Err(e) => return Err(e),
        };

        if !rbenv.is_installed(&name) {
            return Err(RbinstallError::NotInstalled(name));
        }

        let spinner = ctx.options.spinner;
        Task::new(format!("Uninstalling {name}"), spinner).run(|| rbenv.uninstall(&name))?;
        Task::new("Rehashing shims", spinner).run(|| rbenv.rehash())?;

        info!("Uninstalled version {name}");
        println!("{} {} uninstalled", "Version".green(), name.green().bold());
        Ok(name)
    }
}
