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

use crate::commands::{resolve_version, warn_user};
use crate::context::Context;
use crate::error::{RbinstallError, Result};
use crate::gems::Gems;
use crate::task::Task;
use colored::Colorize;
use log::debug;

/// What a bulk gem update did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateGemsOutcome {
    Updated { actions: usize },
    NothingToUpdate,
}

pub struct UpdateGemsCommand<'a> {
    ctx: &'a Context,
}

impl<'a> UpdateGemsCommand<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    pub fn execute(&self, requested: &str) -> Result<UpdateGemsOutcome> {
        let ctx = self.ctx;
        let rbenv = ctx.rbenv();
        let spinner = ctx.options.spinner;

        if !ctx.config.gems.allow_update {
            return Err(RbinstallError::GemsUpdateNotAllowed);
        }
        rbenv.preflight()?;

        let name = match resolve_version(ctx, requested) {
            Ok((info, _)) => info.name,
            Err(RbinstallError::VersionNotAvailable { .. }) if rbenv.is_installed(requested) => {
                requested.to_string()
            }
            Err(e) => return Err(e),
        };
        if !rbenv.is_installed(&name) {
            return Err(RbinstallError::NotInstalled(name));
        }

        let gems = Gems::new(
            rbenv.version_path(&name),
            &ctx.config.gems,
            ctx.gem_source(),
            ctx.env(),
            ctx.fail_log_dir(),
            &ctx.user,
        );

        let mut actions = 0;

        if ctx.config.gems.rubygems_update {
            let target = ctx.config.rubygems_version();
            let updated = Task::new(format!("Updating RubyGems to {target}"), spinner)
                .run(|| gems.update_self(target));
            match updated {
                Ok(()) => actions += 1,
                Err(e) => warn_user(&e.to_string()),
            }
        }

        for package in ctx.config.gems_to_install() {
            if gems.is_package_installed(&package) {
                debug!("{package} is installed in {name}, updating");
                Task::new(format!("Updating gem {package}"), spinner)
                    .run(|| gems.update(&package))?;
            } else {
                Task::new(format!("Installing gem {package}"), spinner)
                    .run(|| gems.install(&package))?;
            }
            actions += 1;
        }

        if actions == 0 {
            println!("Nothing to update");
            return Ok(UpdateGemsOutcome::NothingToUpdate);
        }

        Task::new("Rehashing shims", spinner).run(|| rbenv.rehash())?;
        println!("{}", "All gems successfully updated!".green());
        Ok(UpdateGemsOutcome::Updated { actions })
    }
}
