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

use crate::archive::Extractor;
use crate::checksum::verify_checksum;
use crate::commands::{resolve_version, warn_user};
use crate::context::Context;
use crate::download::{DownloadProgressAdapter, downloader_for};
use crate::error::{RbinstallError, Result};
use crate::gems::Gems;
use crate::index::{Category, VersionInfo};
use crate::rbenv::alias_name;
use crate::task::Task;
use crate::user_agent;
use colored::Colorize;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// How an install request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed { name: String, alias: Option<String> },
    AlreadyInstalled(String),
}

pub struct InstallCommand<'a> {
    ctx: &'a Context,
    extractor: Option<PathBuf>,
}

impl<'a> InstallCommand<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Self {
            ctx,
            extractor: None,
        }
    }

    /// Use a specific extractor binary instead of looking `7za` up on `PATH`.
    pub fn with_extractor(mut self, binary: PathBuf) -> Self {
        self.extractor = Some(binary);
        self
    }

    fn extractor(&self) -> Result<Extractor<'_>> {
        let ctx = self.ctx;
        match &self.extractor {
            Some(binary) => Ok(Extractor::with_binary(
                binary.clone(),
                ctx.env(),
                ctx.fail_log_dir(),
                &ctx.user,
            )),
            None => Extractor::locate(ctx.env(), ctx.fail_log_dir(), &ctx.user),
        }
    }

    fn task(&self, description: impl Into<String>) -> Task {
        Task::new(description, self.ctx.options.spinner)
    }

    pub fn execute(&self, requested: &str) -> Result<InstallOutcome> {
        let ctx = self.ctx;
        let rbenv = ctx.rbenv();
        debug!(
            "Install {requested} for {} (reinstall: {})",
            ctx.platform, ctx.options.reinstall
        );

        rbenv.preflight()?;
        let (info, category) = resolve_version(ctx, requested)?;
        let name = info.name.clone();

        if category == Category::Jruby && which::which("java").is_err() {
            return Err(RbinstallError::MissingDependency {
                dependency: "Java".to_string(),
                reason: "JRuby".to_string(),
            });
        }
        let extractor = self.extractor()?;

        if rbenv.is_installed(&name) {
            if !ctx.options.reinstall {
                warn_user(&format!(
                    "Version {name} is already installed, use --reinstall to install it again"
                ));
                return Ok(InstallOutcome::AlreadyInstalled(name));
            }
            if !rbenv.allow_overwrite() {
                return Err(RbinstallError::ReinstallNotAllowed);
            }
        }

        println!("Installing {} ({category}) for {}", name.bold(), ctx.platform);

        let unpack_dir = rbenv.prepare_staging(&name)?;
        let staged = unpack_dir.join(&name);
        ctx.cleanup.register(&staged);

        let promoted = self.fetch_and_promote(&info, category, &extractor, &unpack_dir);
        ctx.cleanup.unregister(&staged);
        if let Err(e) = promoted {
            if let Err(clean) = rbenv.clean_staging(&name) {
                debug!("Can't clean staging for {name}: {clean}");
            }
            return Err(e);
        }

        self.post_install(&name)?;

        let alias = self.make_alias(&name);

        self.task("Rehashing shims").run(|| rbenv.rehash())?;

        match &alias {
            Some(alias) => info!("Installed version {name} as {alias}"),
            None => info!("Installed version {name}"),
        }
        println!(
            "{} {} installed",
            "Version".green(),
            name.green().bold()
        );

        Ok(InstallOutcome::Installed { name, alias })
    }

    /// Stages from download to promotion. Anything left in staging on error
    /// is cleaned by the caller.
    fn fetch_and_promote(
        &self,
        info: &VersionInfo,
        category: Category,
        extractor: &Extractor<'_>,
        unpack_dir: &Path,
    ) -> Result<()> {
        let ctx = self.ctx;
        let archive = ctx.temp_dir().join(&info.file);
        let url = info.url(ctx.config.storage_url());

        Task::new(format!("Downloading {}", info.file), false).run(|| {
            downloader_for(&ctx.config, user_agent::download_client())?
                .with_progress_reporter(Box::new(DownloadProgressAdapter::for_archive(
                    ctx.options.no_progress,
                    &info.file,
                )))
                .download(&url, &archive)
        })?;

        self.task("Verifying checksum")
            .run(|| verify_checksum(&archive, &info.hash))?;

        self.task(format!("Unpacking {}", info.file))
            .run(|| extractor.extract(&archive, unpack_dir))?;

        let staged = unpack_dir.join(&info.name);
        self.task("Checking unpacked binary")
            .run(|| sanity_check(ctx, &staged, &info.name, category))?;

        self.task(format!("Moving {} to versions directory", info.name))
            .run(|| ctx.rbenv().promote(&info.name, ctx.options.reinstall))?;

        Ok(())
    }

    /// RubyGems self-update and the configured gem installs.
    fn post_install(&self, name: &str) -> Result<()> {
        let ctx = self.ctx;
        let gems = Gems::new(
            ctx.rbenv().version_path(name),
            &ctx.config.gems,
            ctx.gem_source(),
            ctx.env(),
            ctx.fail_log_dir(),
            &ctx.user,
        );

        if ctx.config.gems.rubygems_update {
            let target = ctx.config.rubygems_version();
            let updated = self
                .task(format!("Updating RubyGems to {target}"))
                .run(|| gems.update_self(target));
            if let Err(e) = updated {
                warn_user(&e.to_string());
            }
        }

        for package in ctx.config.gems_to_install() {
            self.task(format!("Installing gem {package}"))
                .run(|| gems.install(&package))?;
        }

        Ok(())
    }

    fn make_alias(&self, name: &str) -> Option<String> {
        alias_name(name)?;

        match self.ctx.rbenv().make_alias(name) {
            Ok(alias) => alias,
            Err(e) => {
                warn_user(&format!("Can't create alias for {name}: {e}"));
                None
            }
        }
    }
}

/// Interpreter binary shipped in `bin/` of each category
pub fn runtime_binary(category: Category) -> &'static str {
    match category {
        Category::Jruby => "jruby",
        Category::Rubinius => "rbx",
        _ => "ruby",
    }
}

/// Run `<staged>/bin/<runtime> --version`. Only a failure to start counts.
fn sanity_check(ctx: &Context, staged: &Path, name: &str, category: Category) -> Result<()> {
    let binary = staged.join("bin").join(runtime_binary(category));

    let mut command = Command::new(&binary);
    command
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    ctx.env().apply(&mut command);

    let status = command.status().map_err(|e| RbinstallError::SanityCheck {
        name: name.to_string(),
        message: format!("{}: {e}", binary.display()),
    })?;
    debug!("{} --version exited with {status}", binary.display());
    Ok(())
}
