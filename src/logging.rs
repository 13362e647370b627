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

use crate::config::RbinstallConfig;
use crate::error::Result;
use env_logger::{Builder, Env, Target};
use std::fs::{File, OpenOptions};

/// Filter for the given verbosity (0=warn, 1=info, 2=debug, 3+=trace)
///
/// Without `-V`, a log file receives records at the configured `log:level`
/// while the terminal only sees warnings.
pub fn filter_for(verbose: u8, file_level: Option<&str>) -> String {
    let level = match verbose {
        0 => file_level.unwrap_or("warn"),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("rbinstall={}", level.trim().to_lowercase())
}

/// Open the configured log file for appending, creating it with `log:perms`.
pub fn open_log_file(config: &RbinstallConfig) -> Result<Option<File>> {
    let Some(path) = config.log_file_path() else {
        return Ok(None);
    };

    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(config.log_perms()?);
    }

    Ok(Some(options.open(path)?))
}

/// Initialize the logger, writing to `file` when given and stderr otherwise.
pub fn setup_logger(verbose: u8, level: &str, file: Option<File>) {
    let file_level = file.as_ref().map(|_| level);
    let filter = filter_for(verbose, file_level);

    let mut builder = Builder::from_env(Env::default().default_filter_or(filter));
    builder.format_module_path(false).format_target(false);

    match file {
        Some(file) => {
            builder.target(Target::Pipe(Box::new(file)));
        }
        None => {
            builder.format_timestamp(None);
        }
    }

    // A second initialization (tests, embedding) keeps the first logger
    let _ = builder.try_init();
}
