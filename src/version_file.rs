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

//! Reading the version requested by `.ruby-version` or `.rbenv-version`.

use crate::error::{RbinstallError, Result};
use std::fs;
use std::io;
use std::path::Path;

pub const VERSION_FILES: [&str; 2] = [".ruby-version", ".rbenv-version"];

/// Version named by the first version file found in `dir`.
pub fn read_version_file(dir: &Path) -> Result<String> {
    for name in VERSION_FILES {
        let path = dir.join(name);
        match fs::read_to_string(&path) {
            Ok(contents) => return parse_version(&contents, &path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(RbinstallError::ValidationError(format!(
        "Neither {} nor {} found in {}",
        VERSION_FILES[0],
        VERSION_FILES[1],
        dir.display()
    )))
}

fn parse_version(contents: &str, path: &Path) -> Result<String> {
    let token = contents.split_whitespace().next().unwrap_or_default();
    let token = token.strip_prefix("ruby-").unwrap_or(token);

    if token.is_empty() {
        return Err(RbinstallError::ValidationError(format!(
            "{} is empty",
            path.display()
        )));
    }
    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ruby_version_preferred() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".ruby-version"), "2.1.5\n").unwrap();
        fs::write(temp.path().join(".rbenv-version"), "1.9.3-p551\n").unwrap();

        assert_eq!(read_version_file(temp.path()).unwrap(), "2.1.5");
    }

    #[test]
    fn test_rbenv_version_fallback_and_prefix() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".rbenv-version"), "  ruby-2.0.0-p598  \n").unwrap();

        assert_eq!(read_version_file(temp.path()).unwrap(), "2.0.0-p598");
    }

    #[test]
    fn test_jruby_name_is_kept() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".ruby-version"), "jruby-1.7.16").unwrap();

        assert_eq!(read_version_file(temp.path()).unwrap(), "jruby-1.7.16");
    }

    #[test]
    fn test_missing_or_empty() {
        let temp = TempDir::new().unwrap();
        assert!(read_version_file(temp.path()).is_err());

        fs::write(temp.path().join(".ruby-version"), "\n").unwrap();
        assert!(matches!(
            read_version_file(temp.path()),
            Err(RbinstallError::ValidationError(_))
        ));
    }
}
