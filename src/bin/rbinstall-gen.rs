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
use rbinstall::error::{Result, format_error_with_color, get_exit_code};
use rbinstall::generator::{Generator, default_output, load_previous, write_index};
use rbinstall::mirror::stats_line;
use rbinstall::{color_enabled, logging, normalize_args};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rbinstall-gen")]
#[command(
    author,
    version,
    about = "Generate index.json for a directory of Ruby archives",
    long_about = None,
    disable_version_flag = true
)]
struct Cli {
    /// Directory laid out as <dist>/<arch>/<name>.7z
    data_dir: PathBuf,

    /// Where to write the index (default: <data_dir>/index.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// End-of-life versions (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    eol: Vec<String>,

    /// Disable colored output
    #[arg(long, visible_alias = "nc")]
    no_color: bool,

    /// Increase verbosity (-V info, -VV debug, -VVV trace)
    #[arg(short = 'V', long, action = ArgAction::Count)]
    verbose: u8,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    print_version: (),
}

fn run(cli: Cli) -> Result<()> {
    let output = cli.output.unwrap_or_else(|| default_output(&cli.data_dir));
    let previous = load_previous(&output)?;

    let mut index = Generator::new(&cli.data_dir)
        .with_eol(cli.eol.iter().map(|name| name.trim()).filter(|name| !name.is_empty()))
        .with_previous(previous)
        .generate()?;

    write_index(&mut index, &output)?;

    println!("{}", stats_line(&index));
    println!("Index saved as {}", output.display().to_string().bold());
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
