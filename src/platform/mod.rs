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

//! Platform identification for choosing the index branch.
//!
//! Only Linux is supported. The distribution key is built from the
//! os-release id and the major version (`centos-7`), the architecture from the
//! kernel machine name.

pub mod permissions;
pub mod user;

use crate::error::{RbinstallError, Result};
use crate::index::Arch;
use log::debug;
use std::fmt;

pub use user::CurrentUser;

/// The (dist, arch) pair the installer works with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub dist: String,
    pub arch: Arch,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.dist, self.arch)
    }
}

/// Probe the running system.
pub fn detect() -> Result<Platform> {
    ensure_supported_os(std::env::consts::OS)?;

    let machine = machine_name()?;
    let arch = arch_tag(&machine)?;

    let distribution = sysinfo::System::distribution_id();
    let os_version = sysinfo::System::os_version().unwrap_or_default();
    let dist = dist_key(&distribution, &os_version)?;

    debug!("Detected platform {dist}/{arch} (machine: {machine}, os version: {os_version})");

    Ok(Platform { dist, arch })
}

pub fn ensure_supported_os(os: &str) -> Result<()> {
    if os == "linux" {
        Ok(())
    } else {
        Err(RbinstallError::UnsupportedOs(os.to_string()))
    }
}

/// Map a raw machine name (`uname -m`) to an index architecture tag.
pub fn arch_tag(machine: &str) -> Result<Arch> {
    match machine {
        "i386" | "i586" | "i686" => Ok(Arch::X32),
        "x86_64" => Ok(Arch::X64),
        m if m == "arm" || m.starts_with("armv") => Ok(Arch::Arm),
        other => Err(RbinstallError::UnsupportedArchitecture(other.to_string())),
    }
}

/// Build the distribution key `<lower(name)>-<major>`.
pub fn dist_key(distribution: &str, os_version: &str) -> Result<String> {
    let name = distribution.trim().to_lowercase();
    if name.is_empty() {
        return Err(RbinstallError::UnsupportedOs("unknown distribution".to_string()));
    }

    let major = os_version
        .trim()
        .split('.')
        .next()
        .and_then(|part| part.parse::<u32>().ok())
        .ok_or_else(|| RbinstallError::InvalidOsVersion(os_version.to_string()))?;

    Ok(format!("{name}-{major}"))
}

#[cfg(unix)]
fn machine_name() -> Result<String> {
    use std::ffi::CStr;
    use std::mem;

    let mut uts: libc::utsname = unsafe { mem::zeroed() };
    if unsafe { libc::uname(&mut uts) } != 0 {
        return Err(std::io::Error::last_os_error().into());
    }

    let machine = unsafe { CStr::from_ptr(uts.machine.as_ptr()) };
    Ok(machine.to_string_lossy().into_owned())
}

#[cfg(not(unix))]
fn machine_name() -> Result<String> {
    Ok(std::env::consts::ARCH.to_string())
}
