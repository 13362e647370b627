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
use rbinstall::config::RbinstallConfig;
use rbinstall::error::{RbinstallError, Result, format_error_with_color, get_exit_code};
use rbinstall::mirror::{Mirror, confirm, describe, stats_line};
use rbinstall::{color_enabled, logging, normalize_args};
use colored::Colorize;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rbinstall-clone")]
#[command(
    author,
    version,
    about = "Mirror a Ruby archive repository",
    long_about = None,
    disable_version_flag = true
)]
struct Cli {
    /// Repository URL (the directory holding index.json)
    url: String,

    /// Local directory to mirror into
    dest_dir: PathBuf,

    /// Don't ask for confirmation
    #[arg(short, long)]
    yes: bool,

    /// Disable colored output
    #[arg(long, visible_alias = "nc")]
    no_color: bool,

    /// Disable progress bars
    #[arg(long, visible_alias = "np")]
    no_progress: bool,

    /// Increase verbosity (-V info, -VV debug, -VVV trace)
    #[arg(short = 'V', long, action = ArgAction::Count)]
    verbose: u8,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    print_version: (),
}

fn run(cli: Cli) -> Result<()> {
    // The cloner only needs proxy settings, so a missing config file is fine
    let config = RbinstallConfig::load().unwrap_or_default();

    let mut mirror = Mirror::new(&cli.url, &cli.dest_dir, &config)?
        .no_progress(cli.no_progress || !io::stderr().is_terminal());
    let index = mirror.fetch_index()?;

    for line in describe(&index) {
        println!("{line}");
    }
    println!("{}", stats_line(&index).bold());

    if !cli.yes {
        let prompt = format!("Mirror into {}?", cli.dest_dir.display());
        if !confirm(&prompt, &mut io::stdin().lock(), &mut io::stdout())? {
            return Err(RbinstallError::Cancelled);
        }
    }

    let report = mirror.clone_index(&index)?;
    println!(
        "{} {} downloaded, {} already up to date",
        "Done:".green(),
        report.downloaded,
        report.skipped
    );
    Ok(())
}

fn main() {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    let use_color = color_enabled(cli.no_color);
    colored::control::set_override(use_color);
    logging::setup_logger(cli.verbose, "warn", None);

    if let Err(e) = run(cli) {
        eprintln!("{}", format_error_with_color(&e, use_color));
        std::process::exit(get_exit_code(&e));
    }
}
