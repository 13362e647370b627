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

//! Sandboxed rbenv trees, fake helper binaries and a local storage server.

#![allow(dead_code)]

use rbinstall::config::RbinstallConfig;
use rbinstall::context::{Context, RunOptions};
use rbinstall::index::{Arch, Category, Index, VersionInfo};
use rbinstall::platform::{CurrentUser, Platform};
use rbinstall::rbenv::RbenvEnv;
use rbinstall::signals::CleanupRegistry;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const DIST: &str = "centos-7";

/// Unpacks `<name>.7z` into `<dest>/<name>` with a runnable `bin/ruby`
const FAKE_7ZA: &str = r#"#!/bin/sh
dest=""
archive=""
for arg in "$@"; do
  case "$arg" in
    -o*) dest="${arg#-o}" ;;
    *) archive="$arg" ;;
  esac
done
name=$(basename "$archive" .7z)
mkdir -p "$dest/$name/bin"
printf '#!/bin/sh\necho "ruby 2.0.0"\n' > "$dest/$name/bin/ruby"
chmod 755 "$dest/$name/bin/ruby"
"#;

pub struct Sandbox {
    pub temp: TempDir,
    pub server: mockito::ServerGuard,
}

impl Sandbox {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("tmp")).unwrap();
        fs::create_dir_all(root.join("rbenv/versions")).unwrap();
        fs::create_dir_all(root.join("rbenv/libexec")).unwrap();
        fs::create_dir_all(root.join("bin")).unwrap();

        let sandbox = Self {
            temp,
            server: mockito::Server::new(),
        };
        write_script(
            &sandbox.rbenv_root().join("libexec/rbenv"),
            &format!(
                "#!/bin/sh\necho \"$@\" >> {}\n",
                sandbox.rehash_log().display()
            ),
        );
        write_script(&sandbox.extractor(), FAKE_7ZA);
        sandbox
    }

    pub fn rbenv_root(&self) -> PathBuf {
        self.temp.path().join("rbenv")
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.rbenv_root().join("versions")
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.temp.path().join("tmp")
    }

    pub fn extractor(&self) -> PathBuf {
        self.temp.path().join("bin/7za")
    }

    pub fn rehash_log(&self) -> PathBuf {
        self.temp.path().join("rehash.log")
    }

    /// Number of times `rbenv` was invoked
    pub fn rehash_count(&self) -> usize {
        fs::read_to_string(self.rehash_log())
            .map(|log| log.lines().count())
            .unwrap_or(0)
    }

    pub fn config(&self) -> RbinstallConfig {
        let mut config = RbinstallConfig::default();
        config.main.tmp_dir = self.tmp_dir();
        config.storage.url = self.server.url();
        config.rbenv.dir = self.rbenv_root();
        config
    }

    pub fn context(&self, config: RbinstallConfig, index: Index, options: RunOptions) -> Context {
        Context::new(
            config,
            index,
            platform(),
            test_user(),
            options,
            CleanupRegistry::new(),
        )
        .unwrap()
        .with_env(RbenvEnv::empty())
    }

    /// Lay out an already installed version holding an `OLD_INSTALL` marker.
    pub fn install_fake_version(&self, name: &str) -> PathBuf {
        let dir = self.versions_dir().join(name);
        fs::create_dir_all(dir.join("bin")).unwrap();
        fs::write(dir.join("OLD_INSTALL"), "old").unwrap();
        dir
    }

    /// Serve `body` at the archive URL of `name`.
    pub fn serve_archive(&mut self, name: &str, body: &[u8]) -> mockito::Mock {
        self.server
            .mock("GET", format!("/{DIST}/x64/{name}.7z").as_str())
            .with_status(200)
            .with_body(body)
            .create()
    }
}

pub fn platform() -> Platform {
    Platform {
        dist: DIST.to_string(),
        arch: Arch::X64,
    }
}

pub fn test_user() -> CurrentUser {
    CurrentUser {
        uid: 1000,
        gid: 1000,
        name: "builder".to_string(),
        real_uid: 1000,
        real_gid: 1000,
    }
}

pub fn sha256(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

pub fn version_info(name: &str, body: &[u8]) -> VersionInfo {
    VersionInfo {
        name: name.to_string(),
        file: format!("{name}.7z"),
        path: format!("{DIST}/x64"),
        size: body.len() as u64,
        hash: sha256(body),
        added: 1_418_000_000,
        ..VersionInfo::default()
    }
}

pub fn index_with(name: &str, body: &[u8]) -> Index {
    let mut index = Index::new();
    index.add(DIST, Arch::X64, Category::Ruby, version_info(name, body));
    index.update_metadata();
    index
}

pub fn write_script(path: &Path, body: &str) {
    fs::write(path, body).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }
}
