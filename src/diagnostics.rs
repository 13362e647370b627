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

//! Capturing subprocess output and persisting it for the user on failure.

use crate::platform::user::CurrentUser;
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

pub const FAIL_LOG_NAME: &str = "rbinstall-fail.log";

/// Result of a finished child process
#[derive(Debug)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    /// stdout followed by stderr
    pub output: String,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Run `command` to completion, collecting stdout and stderr.
///
/// Fails only when the program can't be started; a non-zero exit is
/// reported through [`CapturedOutput::status`].
pub fn run_captured(command: &mut Command) -> io::Result<CapturedOutput> {
    debug!("Running {command:?}");

    let output = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.stderr.is_empty() {
        if !combined.is_empty() && !combined.ends_with('\n') {
            combined.push('\n');
        }
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
    }

    debug!("{command:?} exited with {}", output.status);
    Ok(CapturedOutput {
        status: output.status,
        output: combined,
    })
}

/// Write `output` to `<tmp_dir>/rbinstall-fail.log`, owned by the invoking user.
///
/// Returns the path on success. Failures to write are logged and swallowed
/// since the caller is already reporting a more important error.
pub fn write_fail_log(tmp_dir: &Path, output: &str, user: &CurrentUser) -> Option<PathBuf> {
    let path = tmp_dir.join(FAIL_LOG_NAME);

    match try_write_fail_log(&path, output, user) {
        Ok(()) => Some(path),
        Err(e) => {
            warn!("Can't save command output to {}: {e}", path.display());
            None
        }
    }
}

fn try_write_fail_log(path: &Path, output: &str, user: &CurrentUser) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    fs::write(path, format!("{}\n\n", output.trim()))?;
    chown_to(path, user)
}

#[cfg(unix)]
fn chown_to(path: &Path, user: &CurrentUser) -> io::Result<()> {
    // Only root may hand a file to somebody else
    if user.uid != 0 || user.real_uid == 0 {
        return Ok(());
    }
    std::os::unix::fs::chown(path, Some(user.real_uid), Some(user.real_gid))
}

#[cfg(not(unix))]
fn chown_to(_path: &Path, _user: &CurrentUser) -> io::Result<()> {
    Ok(())
}
