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
use crate::index::{Arch, Category};
use sha2::{Digest, Sha256};
use std::io::Cursor;
use tempfile::TempDir;

fn sha256(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn info(name: &str, body: &[u8]) -> VersionInfo {
    VersionInfo {
        name: name.to_string(),
        file: format!("{name}.7z"),
        path: "centos-7/x64".to_string(),
        size: body.len() as u64,
        hash: sha256(body),
        added: 1_418_000_000,
        ..VersionInfo::default()
    }
}

fn remote_index() -> Index {
    let mut index = Index::new();
    let mut base = info("2.0.0-p598", b"base archive");
    base.variations
        .push(info("2.0.0-p598-railsexpress", b"railsexpress archive"));
    index.add("centos-7", Arch::X64, Category::Ruby, base);
    index.add("centos-7", Arch::X64, Category::Jruby, info("jruby-1.7.16", b"jruby"));
    index.sort();
    index.update_metadata();
    index
}

fn mirror_for(server: &mockito::ServerGuard, dest: &Path) -> Mirror {
    Mirror::new(&server.url(), dest, &RbinstallConfig::default())
        .unwrap()
        .no_progress(true)
}

#[test]
fn test_clone_downloads_and_skips_current_files() {
    let mut server = mockito::Server::new();
    let index = remote_index();
    let index_body = serde_json::to_vec(&index).unwrap();

    let index_mock = server
        .mock("GET", "/index.json")
        .with_status(200)
        .with_body(index_body)
        .create();
    let base_mock = server
        .mock("GET", "/centos-7/x64/2.0.0-p598.7z")
        .with_status(200)
        .with_body("base archive")
        .create();
    let variation_mock = server
        .mock("GET", "/centos-7/x64/2.0.0-p598-railsexpress.7z")
        .with_status(200)
        .with_body("railsexpress archive")
        .create();
    let jruby_mock = server
        .mock("GET", "/centos-7/x64/jruby-1.7.16.7z")
        .expect(0)
        .create();

    let dest = TempDir::new().unwrap();
    fs::create_dir_all(dest.path().join("centos-7/x64")).unwrap();
    fs::write(dest.path().join("centos-7/x64/jruby-1.7.16.7z"), "jruby").unwrap();

    let mut mirror = mirror_for(&server, dest.path());
    let fetched = mirror.fetch_index().unwrap();
    let report = mirror.clone_index(&fetched).unwrap();

    assert_eq!(
        report,
        MirrorReport {
            downloaded: 2,
            skipped: 1,
            bytes: ("base archive".len() + "railsexpress archive".len()) as u64,
        }
    );
    assert_eq!(
        fs::read_to_string(dest.path().join("centos-7/x64/2.0.0-p598-railsexpress.7z")).unwrap(),
        "railsexpress archive"
    );

    let written = Index::decode(&fs::read(dest.path().join(INDEX_FILE_NAME)).unwrap()).unwrap();
    assert_eq!(written, index);

    index_mock.assert();
    base_mock.assert();
    variation_mock.assert();
    jruby_mock.assert();
}

#[test]
fn test_corrupt_download_is_removed() {
    let mut server = mockito::Server::new();
    let mut index = Index::new();
    index.add(
        "centos-7",
        Arch::X64,
        Category::Ruby,
        info("2.1.5", b"expected bytes"),
    );

    let _archive = server
        .mock("GET", "/centos-7/x64/2.1.5.7z")
        .with_status(200)
        .with_body("truncated")
        .create();

    let dest = TempDir::new().unwrap();
    let mut mirror = mirror_for(&server, dest.path());

    assert!(matches!(
        mirror.clone_index(&index),
        Err(RbinstallError::ChecksumMismatch { .. })
    ));
    assert!(!dest.path().join("centos-7/x64/2.1.5.7z").exists());
    assert!(!dest.path().join(INDEX_FILE_NAME).exists());
}

#[test]
fn test_missing_archive_fails_without_retry() {
    let mut server = mockito::Server::new();
    let mut index = Index::new();
    index.add("centos-7", Arch::X64, Category::Ruby, info("2.1.5", b"x"));

    let missing = server
        .mock("GET", "/centos-7/x64/2.1.5.7z")
        .with_status(404)
        .expect(1)
        .create();

    let dest = TempDir::new().unwrap();
    let mut mirror = mirror_for(&server, dest.path());

    assert!(matches!(
        mirror.clone_index(&index),
        Err(RbinstallError::HttpStatus { status: 404, .. })
    ));
    missing.assert();
}

#[test]
fn test_empty_repository() {
    let mut server = mockito::Server::new();
    let _index = server
        .mock("GET", "/index.json")
        .with_status(200)
        .with_body(r#"{"meta":{"created":0,"size":0,"items":0},"data":{}}"#)
        .create();

    let dest = TempDir::new().unwrap();
    assert!(matches!(
        mirror_for(&server, dest.path()).fetch_index(),
        Err(RbinstallError::EmptyRepository)
    ));
}

#[test]
fn test_describe_and_stats() {
    let index = remote_index();

    assert_eq!(describe(&index), vec!["centos-7/x64  ruby: 2, jruby: 1"]);
    let size = ("base archive".len() + "railsexpress archive".len() + "jruby".len()) as u64;
    assert_eq!(
        stats_line(&index),
        format!("3 versions, total size {}", HumanBytes(size))
    );
}

#[test]
fn test_confirm() {
    let mut output = Vec::new();
    assert!(confirm("Continue?", &mut Cursor::new("y\n"), &mut output).unwrap());
    assert_eq!(String::from_utf8(output).unwrap(), "Continue? [y/N] ");

    let mut sink = Vec::new();
    assert!(confirm("Continue?", &mut Cursor::new("YES\n"), &mut sink).unwrap());
    assert!(!confirm("Continue?", &mut Cursor::new("\n"), &mut sink).unwrap());
    assert!(!confirm("Continue?", &mut Cursor::new(""), &mut sink).unwrap());
}
