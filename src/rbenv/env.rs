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
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

const PROXY_VARS: [&str; 4] = ["http_proxy", "https_proxy", "HTTP_PROXY", "HTTPS_PROXY"];

/// Environment handed to every child process the installer spawns.
#[derive(Debug, Clone, Default)]
pub struct RbenvEnv {
    vars: Vec<(String, OsString)>,
}

impl RbenvEnv {
    /// Wire rbenv into the environment unless `RBENV_ROOT` is already set,
    /// and export the proxy when one is configured.
    pub fn new(rbenv_dir: &Path, proxy: Option<&str>) -> Self {
        Self::from_parts(
            rbenv_dir,
            proxy,
            env::var_os("RBENV_ROOT").is_some(),
            env::var_os("PATH"),
        )
    }

    /// An environment that changes nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    fn from_parts(
        rbenv_dir: &Path,
        proxy: Option<&str>,
        root_already_set: bool,
        path: Option<OsString>,
    ) -> Self {
        let mut vars = Vec::new();

        if !root_already_set {
            vars.push(("RBENV_ROOT".to_string(), rbenv_dir.as_os_str().to_owned()));

            let mut entries: Vec<PathBuf> = vec![rbenv_dir.join("bin"), rbenv_dir.join("libexec")];
            if let Some(path) = &path {
                entries.extend(env::split_paths(path));
            }
            if let Ok(joined) = env::join_paths(entries) {
                vars.push(("PATH".to_string(), joined));
            }
        }

        if let Some(proxy) = proxy {
            for name in PROXY_VARS {
                vars.push((name.to_string(), OsString::from(proxy)));
            }
        }

        Self { vars }
    }

    pub fn apply<'c>(&self, command: &'c mut Command) -> &'c mut Command {
        for (name, value) in &self.vars {
            command.env(name, value);
        }
        command
    }

    pub fn get(&self, name: &str) -> Option<&OsStr> {
        self.vars
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_os_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wires_rbenv_root_and_path() {
        let env = RbenvEnv::from_parts(
            Path::new("/opt/rbenv"),
            None,
            false,
            Some(OsString::from("/usr/bin:/bin")),
        );

        assert_eq!(env.get("RBENV_ROOT"), Some(OsStr::new("/opt/rbenv")));
        assert_eq!(
            env.get("PATH"),
            Some(OsStr::new("/opt/rbenv/bin:/opt/rbenv/libexec:/usr/bin:/bin"))
        );
        assert_eq!(env.get("http_proxy"), None);
    }

    #[test]
    fn test_existing_rbenv_root_is_respected() {
        let env = RbenvEnv::from_parts(
            Path::new("/opt/rbenv"),
            Some("http://proxy:3128"),
            true,
            Some(OsString::from("/usr/bin")),
        );

        assert_eq!(env.get("RBENV_ROOT"), None);
        assert_eq!(env.get("PATH"), None);
        for name in PROXY_VARS {
            assert_eq!(env.get(name), Some(OsStr::new("http://proxy:3128")));
        }
    }

    #[test]
    fn test_apply_sets_child_environment() {
        let env = RbenvEnv::from_parts(Path::new("/opt/rbenv"), None, false, None);
        let mut command = Command::new("true");
        env.apply(&mut command);

        let root = command
            .get_envs()
            .find(|(k, _)| *k == OsStr::new("RBENV_ROOT"))
            .and_then(|(_, v)| v);
        assert_eq!(root, Some(OsStr::new("/opt/rbenv")));
    }
}
