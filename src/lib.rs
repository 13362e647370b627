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

pub mod archive;
pub mod checksum;
pub mod commands;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod download;
pub mod error;
pub mod gems;
pub mod generator;
pub mod index;
pub mod indicator;
pub mod listing;
pub mod logging;
pub mod mirror;
pub mod platform;
pub mod rbenv;
pub mod signals;
pub mod task;
pub mod user_agent;
pub mod version_file;

use std::env;
use std::ffi::OsString;
use std::io::IsTerminal;

/// Whether colored output should be produced on stdout.
///
/// `FAKETTY` forces color when stdout is redirected; `TERM=dumb` disables it.
pub fn color_enabled(no_color: bool) -> bool {
    if no_color || matches!(env::var("TERM").as_deref(), Ok("dumb")) {
        return false;
    }
    std::io::stdout().is_terminal() || env::var_os("FAKETTY").is_some()
}

/// Rewrite the single-dash long forms `-nc` and `-np` into `--no-color`
/// and `--no-progress`. Arguments after `--` are passed through untouched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut positional = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if positional {
                return arg;
            }
            match arg.to_str() {
                Some("--") => {
                    positional = true;
                    arg
                }
                Some("-nc") => OsString::from("--no-color"),
                Some("-np") => OsString::from("--no-progress"),
                _ => arg,
            }
        })
        .collect()
}
