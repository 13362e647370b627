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

//! Access checks for the preflight stage.

use std::path::Path;

#[cfg(unix)]
fn access(path: &Path, mode: libc::c_int) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };

    unsafe { libc::access(c_path.as_ptr(), mode) == 0 }
}

/// Directory exists and the current process can create entries in it
#[cfg(unix)]
pub fn is_writable_dir(path: &Path) -> bool {
    path.is_dir() && access(path, libc::W_OK)
}

/// Directory exists and the current process can traverse it
#[cfg(unix)]
pub fn is_executable_dir(path: &Path) -> bool {
    path.is_dir() && access(path, libc::X_OK)
}

/// Regular file the current process can read and execute
#[cfg(unix)]
pub fn is_readable_executable(path: &Path) -> bool {
    path.is_file() && access(path, libc::R_OK | libc::X_OK)
}

#[cfg(not(unix))]
pub fn is_writable_dir(path: &Path) -> bool {
    path.is_dir()
        && !std::fs::metadata(path)
            .map(|m| m.permissions().readonly())
            .unwrap_or(true)
}

#[cfg(not(unix))]
pub fn is_executable_dir(path: &Path) -> bool {
    path.is_dir()
}

#[cfg(not(unix))]
pub fn is_readable_executable(path: &Path) -> bool {
    path.is_file()
}
