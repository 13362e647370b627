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

use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_config(dir: &Path, storage_url: &str) -> PathBuf {
    let tmp_dir = dir.join("tmp");
    fs::create_dir_all(&tmp_dir).unwrap();
    let path = dir.join("rbinstall.toml");
    fs::write(
        &path,
        format!(
            "[main]\ntmp-dir = \"{}\"\n\n[storage]\nurl = \"{storage_url}\"\n\n[rbenv]\ndir = \"{}\"\n",
            tmp_dir.display(),
            dir.join("rbenv").display()
        ),
    )
    .unwrap();
    path
}

fn rbinstall() -> Command {
    let mut cmd = Command::cargo_bin("rbinstall").unwrap();
    cmd.env_remove("RBINSTALL_CONFIG");
    cmd
}

#[test]
fn test_help_lists_flags() {
    rbinstall()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--reinstall"))
        .stdout(contains("--uninstall"))
        .stdout(contains("--gems-update"))
        .stdout(contains("--rehash"))
        .stdout(contains("--ruby-version"))
        .stdout(contains("--no-progress"));
}

#[test]
fn test_short_version_flag() {
    rbinstall()
        .arg("-v")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_single_dash_no_color_and_no_progress() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing.toml");

    rbinstall()
        .env("RBINSTALL_CONFIG", &missing)
        .arg("-nc")
        .assert()
        .failure()
        .code(1)
        .stderr(contains("does not exist"));

    rbinstall()
        .env("RBINSTALL_CONFIG", &missing)
        .args(["-np", "2.1.5"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("does not exist"));
}

#[test]
fn test_reinstall_conflicts_with_uninstall() {
    rbinstall()
        .args(["-R", "-U", "2.0.0-p598"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("cannot be used with"));
}

#[test]
fn test_missing_config_file() {
    let temp = TempDir::new().unwrap();
    rbinstall()
        .env("RBINSTALL_CONFIG", temp.path().join("missing.toml"))
        .arg("--no-color")
        .assert()
        .failure()
        .code(1)
        .stderr(contains("does not exist"));
}

#[test]
fn test_empty_storage_url_is_rejected() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "");

    rbinstall()
        .env("RBINSTALL_CONFIG", &config)
        .arg("--no-color")
        .assert()
        .failure()
        .code(1)
        .stderr(contains("storage:url"));
}

#[test]
fn test_ruby_version_flag_needs_version_file() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "http://127.0.0.1:1");

    rbinstall()
        .env("RBINSTALL_CONFIG", &config)
        .current_dir(temp.path())
        .args(["--no-color", "-r"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains(".ruby-version"));
}

#[test]
fn test_generator_writes_index() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    fs::create_dir_all(data.join("centos-7/x64")).unwrap();
    fs::write(data.join("centos-7/x64/2.1.5.7z"), "ruby").unwrap();
    fs::write(data.join("centos-7/x64/jruby-1.7.16.7z"), "jruby").unwrap();

    Command::cargo_bin("rbinstall-gen")
        .unwrap()
        .arg(&data)
        .args(["--no-color", "--eol", "2.1.5"])
        .assert()
        .success()
        .stdout(contains("2 versions"));

    let index: serde_json::Value =
        serde_json::from_slice(&fs::read(data.join("index.json")).unwrap()).unwrap();
    assert_eq!(index["meta"]["items"], 2);
    assert_eq!(index["data"]["centos-7"]["x64"]["ruby"][0]["name"], "2.1.5");
    assert_eq!(index["data"]["centos-7"]["x64"]["ruby"][0]["eol"], true);
    assert_eq!(index["data"]["centos-7"]["x64"]["jruby"][0]["size"], 5);
}

#[test]
fn test_tools_share_version_and_verbose_flags() {
    for bin in ["rbinstall-gen", "rbinstall-clone"] {
        Command::cargo_bin(bin)
            .unwrap()
            .arg("-v")
            .assert()
            .success()
            .stdout(contains(env!("CARGO_PKG_VERSION")));
    }

    let temp = TempDir::new().unwrap();
    Command::cargo_bin("rbinstall-gen")
        .unwrap()
        .arg(temp.path().join("nowhere"))
        .args(["-VV", "-nc"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("is not a directory"));
}

#[test]
fn test_generator_rejects_missing_directory() {
    let temp = TempDir::new().unwrap();
    Command::cargo_bin("rbinstall-gen")
        .unwrap()
        .arg(temp.path().join("nowhere"))
        .arg("--no-color")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_clone_mirrors_repository() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    fs::create_dir_all(data.join("centos-7/x64")).unwrap();
    fs::write(data.join("centos-7/x64/2.1.5.7z"), "ruby archive").unwrap();

    Command::cargo_bin("rbinstall-gen")
        .unwrap()
        .arg(&data)
        .arg("--no-color")
        .assert()
        .success();

    let mut server = mockito::Server::new();
    let index_body = fs::read(data.join("index.json")).unwrap();
    server
        .mock("GET", "/index.json")
        .with_status(200)
        .with_body(&index_body)
        .create();
    server
        .mock("GET", "/centos-7/x64/2.1.5.7z")
        .with_status(200)
        .with_body("ruby archive")
        .create();

    let dest = temp.path().join("mirror");
    Command::cargo_bin("rbinstall-clone")
        .unwrap()
        .env("RBINSTALL_CONFIG", temp.path().join("missing.toml"))
        .arg(server.url())
        .arg(&dest)
        .args(["--yes", "--no-color", "--no-progress"])
        .assert()
        .success()
        .stdout(contains("centos-7/x64"))
        .stdout(contains("1 downloaded"));

    assert_eq!(
        fs::read_to_string(dest.join("centos-7/x64/2.1.5.7z")).unwrap(),
        "ruby archive"
    );
    assert!(dest.join("index.json").is_file());
}

#[test]
fn test_clone_declined() {
    let temp = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/index.json")
        .with_status(200)
        .with_body(
            r#"{"meta":{"created":0,"size":4,"items":1},"data":{"centos-7":{"x64":{"ruby":[
                {"name":"2.1.5","file":"2.1.5.7z","path":"centos-7/x64","size":4,"hash":"abcd","added":0}
            ]}}}}"#,
        )
        .create();

    let dest = temp.path().join("mirror");
    Command::cargo_bin("rbinstall-clone")
        .unwrap()
        .env("RBINSTALL_CONFIG", temp.path().join("missing.toml"))
        .arg(server.url())
        .arg(&dest)
        .args(["-nc", "-np"])
        .write_stdin("n\n")
        .assert()
        .failure()
        .code(1)
        .stderr(contains("canceled"));

    assert!(!dest.exists());
}
