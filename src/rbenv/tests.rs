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

use super::*;
use crate::config::RbenvConfig;
use tempfile::TempDir;

struct FakeRbenv {
    _temp: TempDir,
    root: PathBuf,
    rbenv: Rbenv,
}

fn fake_rbenv(configure: impl FnOnce(&mut RbenvConfig)) -> FakeRbenv {
    let temp = TempDir::new().unwrap();
    let mut config = RbenvConfig {
        dir: temp.path().to_path_buf(),
        ..RbenvConfig::default()
    };
    configure(&mut config);

    fs::create_dir_all(temp.path().join(VERSIONS_DIR)).unwrap();
    fs::create_dir_all(temp.path().join("libexec")).unwrap();

    FakeRbenv {
        rbenv: Rbenv::new(&config, RbenvEnv::empty()),
        root: temp.path().to_path_buf(),
        _temp: temp,
    }
}

fn stage(rbenv: &Rbenv, name: &str, marker: &str) {
    let dir = rbenv.prepare_staging(name).unwrap().join(name).join("bin");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("marker"), marker).unwrap();
}

#[cfg(unix)]
fn write_entry_point(fake: &FakeRbenv, body: &str) {
    use std::os::unix::fs::PermissionsExt;
    let path = fake.root.join("libexec/rbenv");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
}

#[test]
fn test_layout() {
    let fake = fake_rbenv(|_| {});
    let root = &fake.root;

    assert_eq!(fake.rbenv.version_path("2.1.5"), root.join("versions/2.1.5"));
    assert_eq!(fake.rbenv.unpack_dir(), root.join("versions/.rbinstall"));
}

#[test]
fn test_alias_name() {
    assert_eq!(alias_name("2.0.0-p0"), Some("2.0.0".to_string()));
    assert_eq!(alias_name("1.9.3-p0"), Some("1.9.3".to_string()));
    assert_eq!(alias_name("2.0.0-p598"), None);
    assert_eq!(alias_name("2.1.5"), None);
}

#[test]
fn test_promote_and_installed_set() {
    let fake = fake_rbenv(|_| {});
    let rbenv = &fake.rbenv;

    assert!(!rbenv.is_installed("2.1.5"));
    stage(rbenv, "2.1.5", "fresh");
    rbenv.promote("2.1.5", false).unwrap();

    assert!(rbenv.is_installed("2.1.5"));
    assert!(!rbenv.unpack_dir().join("2.1.5").exists());

    let installed: Vec<String> = rbenv.installed_set().unwrap().into_iter().collect();
    assert_eq!(installed, vec!["2.1.5".to_string()]);
}

#[test]
fn test_reinstall_replaces_previous_tree() {
    let fake = fake_rbenv(|_| {});
    let rbenv = &fake.rbenv;

    stage(rbenv, "2.1.5", "old");
    rbenv.promote("2.1.5", false).unwrap();
    fs::write(rbenv.version_path("2.1.5").join("leftover"), "x").unwrap();

    stage(rbenv, "2.1.5", "new");
    rbenv.promote("2.1.5", true).unwrap();

    let path = rbenv.version_path("2.1.5");
    assert_eq!(fs::read_to_string(path.join("bin/marker")).unwrap(), "new");
    assert!(!path.join("leftover").exists());
}

#[test]
fn test_reinstall_refused_without_overwrite() {
    let fake = fake_rbenv(|c| c.allow_overwrite = false);
    let rbenv = &fake.rbenv;

    stage(rbenv, "2.1.5", "old");
    rbenv.promote("2.1.5", false).unwrap();
    stage(rbenv, "2.1.5", "new");

    assert!(matches!(
        rbenv.promote("2.1.5", true),
        Err(RbinstallError::Promotion(_))
    ));
    assert_eq!(
        fs::read_to_string(rbenv.version_path("2.1.5").join("bin/marker")).unwrap(),
        "old"
    );
}

#[test]
fn test_prepare_staging_clears_previous_attempt() {
    let fake = fake_rbenv(|_| {});
    let rbenv = &fake.rbenv;

    stage(rbenv, "2.1.5", "partial");
    let unpack = rbenv.prepare_staging("2.1.5").unwrap();
    assert!(!unpack.join("2.1.5").exists());
    assert!(unpack.is_dir());
}

#[cfg(unix)]
#[test]
fn test_alias_created_and_removed_on_uninstall() {
    let fake = fake_rbenv(|c| c.make_alias = true);
    let rbenv = &fake.rbenv;

    stage(rbenv, "2.0.0-p0", "p0");
    rbenv.promote("2.0.0-p0", false).unwrap();

    assert_eq!(rbenv.make_alias("2.0.0-p0").unwrap(), Some("2.0.0".to_string()));
    let alias = rbenv.version_path("2.0.0");
    assert_eq!(fs::read_link(&alias).unwrap(), rbenv.version_path("2.0.0-p0"));

    // An existing alias is left alone
    assert_eq!(rbenv.make_alias("2.0.0-p0").unwrap(), None);

    rbenv.uninstall("2.0.0-p0").unwrap();
    assert!(!rbenv.is_installed("2.0.0-p0"));
    assert!(fs::symlink_metadata(&alias).is_err());
}

#[test]
fn test_alias_disabled() {
    let fake = fake_rbenv(|c| c.make_alias = false);
    stage(&fake.rbenv, "2.0.0-p0", "p0");
    fake.rbenv.promote("2.0.0-p0", false).unwrap();
    assert_eq!(fake.rbenv.make_alias("2.0.0-p0").unwrap(), None);
}

#[test]
fn test_uninstall_policy_and_missing() {
    let fake = fake_rbenv(|c| c.allow_uninstall = false);
    stage(&fake.rbenv, "2.1.5", "x");
    fake.rbenv.promote("2.1.5", false).unwrap();

    assert!(matches!(
        fake.rbenv.uninstall("2.1.5"),
        Err(RbinstallError::UninstallNotAllowed)
    ));
    assert!(fake.rbenv.is_installed("2.1.5"));

    let fake = fake_rbenv(|_| {});
    assert!(matches!(
        fake.rbenv.uninstall("9.9.9"),
        Err(RbinstallError::NotInstalled(_))
    ));
}

#[cfg(unix)]
#[test]
fn test_preflight() {
    let fake = fake_rbenv(|_| {});
    assert!(matches!(
        fake.rbenv.preflight(),
        Err(RbinstallError::RbenvNotFound { .. })
    ));

    write_entry_point(&fake, "exit 0");
    fake.rbenv.preflight().unwrap();

    fs::remove_dir_all(fake.rbenv.versions_dir()).unwrap();
    assert!(matches!(
        fake.rbenv.preflight(),
        Err(RbinstallError::VersionsDirNotWritable(_))
    ));
}

#[cfg(unix)]
#[test]
fn test_rehash() {
    let fake = fake_rbenv(|_| {});
    let log = fake.root.join("calls");
    write_entry_point(
        &fake,
        &format!("echo \"$@\" >> {}", log.display()),
    );

    fake.rbenv.rehash().unwrap();
    assert_eq!(fs::read_to_string(&log).unwrap(), "rehash\n");

    write_entry_point(&fake, "echo 'cannot rehash: .rbenv-shim exists' >&2; exit 1");
    match fake.rbenv.rehash() {
        Err(RbinstallError::Rehash { output }) => {
            assert_eq!(output, "cannot rehash: .rbenv-shim exists")
        }
        other => panic!("Expected Rehash error, got {other:?}"),
    }
}
