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

pub mod install;
pub mod list;
pub mod rehash;
pub mod uninstall;
pub mod update_gems;

pub use install::{InstallCommand, InstallOutcome};
pub use list::ListCommand;
pub use rehash::RehashCommand;
pub use uninstall::UninstallCommand;
pub use update_gems::{UpdateGemsCommand, UpdateGemsOutcome};

use crate::context::Context;
use crate::error::{RbinstallError, Result, format_warning};
use crate::index::{Category, VersionInfo};
use log::{debug, warn};

/// Find `name` for the current platform, trying `<name>-p0` as a fallback.
pub fn resolve_version(ctx: &Context, name: &str) -> Result<(VersionInfo, Category)> {
    let platform = &ctx.platform;

    let found = ctx
        .index
        .find(&platform.dist, platform.arch, name)
        .or_else(|| {
            if name.contains("-p") {
                return None;
            }
            let patched = format!("{name}-p0");
            debug!("{name} not found, trying {patched}");
            ctx.index.find(&platform.dist, platform.arch, &patched)
        });

    match found {
        Some((info, category)) => {
            info.validate()?;
            Ok((info.clone(), category))
        }
        None => Err(RbinstallError::VersionNotAvailable {
            name: name.to_string(),
            dist: platform.dist.clone(),
            arch: platform.arch.to_string(),
        }),
    }
}

/// Print and log a problem that doesn't stop the pipeline.
pub fn warn_user(message: &str) {
    warn!("{message}");
    let use_color = colored::control::SHOULD_COLORIZE.should_colorize();
    println!("{}", format_warning(message, use_color));
}
