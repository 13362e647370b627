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

use std::env;

/// The user running rbinstall and, under `sudo`, the user who invoked it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub uid: u32,
    pub gid: u32,
    pub name: String,
    /// Owner of files written for the user to inspect (fail logs)
    pub real_uid: u32,
    pub real_gid: u32,
}

impl CurrentUser {
    pub fn detect() -> Self {
        let (uid, gid) = effective_ids();
        let name = env::var("USER")
            .or_else(|_| env::var("LOGNAME"))
            .unwrap_or_else(|_| uid.to_string());

        let sudo_uid = env::var("SUDO_UID").ok().and_then(|v| v.parse().ok());
        let sudo_gid = env::var("SUDO_GID").ok().and_then(|v| v.parse().ok());

        match (sudo_uid, sudo_gid) {
            (Some(real_uid), Some(real_gid)) => Self {
                uid,
                gid,
                name: env::var("SUDO_USER").unwrap_or(name),
                real_uid,
                real_gid,
            },
            _ => Self {
                uid,
                gid,
                name,
                real_uid: uid,
                real_gid: gid,
            },
        }
    }

    pub fn is_root(&self) -> bool {
        self.uid == 0
    }
}

#[cfg(unix)]
fn effective_ids() -> (u32, u32) {
    unsafe { (libc::geteuid(), libc::getegid()) }
}

#[cfg(not(unix))]
fn effective_ids() -> (u32, u32) {
    (0, 0)
}
