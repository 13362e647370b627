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

use clap::{ArgAction, Parser};
use rbinstall::commands::{
    InstallCommand, ListCommand, RehashCommand, UninstallCommand, UpdateGemsCommand,
};
use rbinstall::config::RbinstallConfig;
use rbinstall::context::{Context, RunOptions};
use rbinstall::download::downloader_for;
use rbinstall::error::{RbinstallError, Result, format_error_with_color, get_exit_code};
use rbinstall::index::Index;
use rbinstall::platform::{self, CurrentUser};
use rbinstall::signals::{self, CleanupRegistry};
use rbinstall::task::Task;
use rbinstall::version_file::read_version_file;
use rbinstall::{color_enabled, logging, normalize_args, user_agent};
use std::io::IsTerminal;

#[derive(Parser)]
#[command(name = "rbinstall")]
#[command(
    author,
    version,
    about = "Install prebuilt Ruby versions into rbenv",
    long_about = None,
    disable_version_flag = true
)]
struct Cli {
    /// Version to install, uninstall or update gems for
    version: Option<String>,

    /// Reinstall an already installed version
    #[arg(short = 'R', long, conflicts_with = "uninstall")]
    reinstall: bool,

    /// Uninstall the version
    #[arg(short = 'U', long)]
    uninstall: bool,

    /// Update RubyGems and the configured gems of an installed version
    #[arg(short = 'G', long)]
    gems_update: bool,

    /// Only rehash rbenv shims
    #[arg(short = 'H', long)]
    rehash: bool,

    /// Use plain HTTP for the gem source
    #[arg(short = 's', long)]
    gems_insecure: bool,

    /// Take the version from .ruby-version or .rbenv-version
    #[arg(short = 'r', long)]
    ruby_version: bool,

    /// Include end-of-life versions in the list
    #[arg(short = 'a', long)]
    all: bool,

    /// Disable colored output
    #[arg(long, visible_alias = "nc")]
    no_color: bool,

    /// Disable progress bars and spinners
    #[arg(long, visible_alias = "np")]
    no_progress: bool,

    /// Increase verbosity (-V info, -VV debug, -VVV trace)
    #[arg(short = 'V', long, action = ArgAction::Count)]
    verbose: u8,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    print_version: (),
}

enum Action {
    List,
    Install(String),
    Uninstall(String),
    UpdateGems(String),
    Rehash,
}

impl Cli {
    fn action(&self) -> Result<Action> {
        if self.rehash {
            return Ok(Action::Rehash);
        }

        let version = match (&self.version, self.ruby_version) {
            (Some(version), _) => version.clone(),
            (None, true) => read_version_file(&std::env::current_dir()?)?,
            (None, false) => return Ok(Action::List),
        };

        Ok(if self.uninstall {
            Action::Uninstall(version)
        } else if self.gems_update {
            Action::UpdateGems(version)
        } else {
            Action::Install(version)
        })
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = RbinstallConfig::load()?;
    config.validate()?;

    match logging::open_log_file(&config) {
        Ok(file) => logging::setup_logger(cli.verbose, &config.log.level, file),
        Err(e) => {
            logging::setup_logger(cli.verbose, &config.log.level, None);
            log::warn!("Can't open log file: {e}");
        }
    }

    let action = cli.action()?;
    let user = CurrentUser::detect();
    if !matches!(action, Action::List) && !user.is_root() {
        return Err(RbinstallError::PermissionDenied(
            "this command must be run as root".to_string(),
        ));
    }

    let platform = platform::detect()?;
    let cleanup = CleanupRegistry::new();
    signals::install_handler(cleanup.clone())?;

    let spinner = !cli.no_progress && std::io::stdout().is_terminal();
    let index = if matches!(action, Action::Rehash) {
        Index::new()
    } else {
        let downloader = downloader_for(&config, user_agent::download_client())?;
        let storage_url = config.storage_url().to_string();
        Task::new("Fetching repository index", spinner)
            .run(|| downloader.fetch_index(&storage_url))?
    };

    let options = RunOptions {
        reinstall: cli.reinstall,
        gems_insecure: cli.gems_insecure,
        all: cli.all,
        no_progress: cli.no_progress,
        spinner,
    };
    let ctx = Context::new(config, index, platform, user, options, cleanup)?;

    match action {
        Action::List => ListCommand::new(&ctx).execute(!std::io::stdout().is_terminal()),
        Action::Install(version) => InstallCommand::new(&ctx).execute(&version).map(|_| ()),
        Action::Uninstall(version) => UninstallCommand::new(&ctx).execute(&version).map(|_| ()),
        Action::UpdateGems(version) => UpdateGemsCommand::new(&ctx).execute(&version).map(|_| ()),
        Action::Rehash => RehashCommand::new(&ctx).execute(),
    }
}

fn main() {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    let use_color = color_enabled(cli.no_color);
    colored::control::set_override(use_color);

    if let Err(e) = run(&cli) {
        log::error!("{e}");
        eprintln!("{}", format_error_with_color(&e, use_color));
        std::process::exit(get_exit_code(&e));
    }
}
