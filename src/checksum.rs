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

//! SHA-256 digests shared by the installer, the index generator and the
//! mirror cloner.

use crate::error::{RbinstallError, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const CHECKSUM_CHUNK_SIZE: usize = 8192;

pub fn calculate_sha256(file_path: &Path) -> Result<String> {
    let mut file = File::open(file_path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHECKSUM_CHUNK_SIZE];

    loop {
        match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buffer[..n]),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(hex::encode(hasher.finalize()))
}

pub fn verify_checksum(file_path: &Path, expected: &str) -> Result<()> {
    let actual = calculate_sha256(file_path)?;

    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(RbinstallError::ChecksumMismatch {
            path: file_path.display().to_string(),
            expected: expected.to_string(),
            actual,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_calculate_sha256() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(b"Hello, World!")?;

        let checksum = calculate_sha256(temp_file.path())?;

        // Expected SHA256 of "Hello, World!"
        assert_eq!(
            checksum,
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );

        Ok(())
    }

    #[test]
    fn test_verify_checksum_success() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(b"Test content")?;

        let expected = "9d9595c5d94fb65b824f56e9999527dba9542481580d69feb89056aabaa0aa87";
        assert!(verify_checksum(temp_file.path(), expected).is_ok());
        assert!(verify_checksum(temp_file.path(), &expected.to_uppercase()).is_ok());

        Ok(())
    }

    #[test]
    fn test_verify_checksum_mismatch() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(b"Test content")?;

        let wrong_checksum = "0000000000000000000000000000000000000000000000000000000000000000";

        match verify_checksum(temp_file.path(), wrong_checksum) {
            Err(RbinstallError::ChecksumMismatch {
                expected, actual, ..
            }) => {
                assert_eq!(expected, wrong_checksum);
                assert_eq!(
                    actual,
                    "9d9595c5d94fb65b824f56e9999527dba9542481580d69feb89056aabaa0aa87"
                );
            }
            other => panic!("Expected ChecksumMismatch, got {other:?}"),
        }

        Ok(())
    }

    #[test]
    fn test_single_bit_flip_is_detected() -> Result<()> {
        let original: Vec<u8> = (0..=255u8).cycle().take(20_000).collect();
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(&original)?;
        let digest = calculate_sha256(temp_file.path())?;

        for (byte, bit) in [(0usize, 0u8), (8191, 7), (8192, 3), (19_999, 5)] {
            let mut flipped = original.clone();
            flipped[byte] ^= 1 << bit;

            let mut corrupt = NamedTempFile::new()?;
            corrupt.write_all(&flipped)?;
            assert!(
                verify_checksum(corrupt.path(), &digest).is_err(),
                "flip at byte {byte} bit {bit} went unnoticed"
            );
        }

        assert!(verify_checksum(temp_file.path(), &digest).is_ok());
        Ok(())
    }
}
