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

//! Building `index.json` from a directory of archives.
//!
//! The data directory is laid out as `<dist>/<arch>/<name>.7z`. Each archive
//! becomes a version of the category its name implies; names extending
//! another version with a build flavour (`2.1.5-jemalloc`) become variations
//! of that version.

use crate::checksum::calculate_sha256;
use crate::error::{RbinstallError, Result};
use crate::index::{Arch, Category, INDEX_FILE_NAME, Index, VersionInfo};
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::UNIX_EPOCH;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

pub const ARCHIVE_EXTENSION: &str = "7z";

pub struct Generator {
    data_dir: PathBuf,
    eol: BTreeSet<String>,
    previous: Option<Index>,
}

/// One archive found on disk
#[derive(Debug, Clone)]
struct Artifact {
    dist: String,
    arch: Arch,
    info: VersionInfo,
    full_path: PathBuf,
}

impl Generator {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            eol: BTreeSet::new(),
            previous: None,
        }
    }

    /// Names flagged as end-of-life
    pub fn with_eol<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.eol = names.into_iter().map(Into::into).collect();
        self
    }

    /// Index whose hashes are reused for unchanged archives
    pub fn with_previous(mut self, previous: Option<Index>) -> Self {
        self.previous = previous;
        self
    }

    pub fn generate(&self) -> Result<Index> {
        if !self.data_dir.is_dir() {
            return Err(RbinstallError::ValidationError(format!(
                "{} is not a directory",
                self.data_dir.display()
            )));
        }

        let artifacts = self.scan()?;
        let mut grouped: BTreeMap<(String, Arch, Category), Vec<Artifact>> = BTreeMap::new();

        for mut artifact in artifacts {
            artifact.info.hash = self.digest(&artifact)?;
            let category = Category::from_name(&artifact.info.name);
            grouped
                .entry((artifact.dist.clone(), artifact.arch, category))
                .or_default()
                .push(artifact);
        }

        let mut index = Index::new();
        for ((dist, arch, category), artifacts) in grouped {
            for version in nest_variations(artifacts.into_iter().map(|a| a.info).collect()) {
                index.add(&dist, arch, category, version);
            }
        }

        index.sort();
        index.update_metadata();
        Ok(index)
    }

    fn scan(&self) -> Result<Vec<Artifact>> {
        let mut artifacts = Vec::new();

        for entry in WalkDir::new(&self.data_dir)
            .min_depth(3)
            .max_depth(3)
            .sort_by_file_name()
        {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(ARCHIVE_EXTENSION)
            {
                continue;
            }

            let Some(artifact) = self.classify(path)? else {
                continue;
            };
            artifacts.push(artifact);
        }

        Ok(artifacts)
    }

    fn classify(&self, path: &Path) -> Result<Option<Artifact>> {
        let relative = path.strip_prefix(&self.data_dir).unwrap_or(path);
        let parts: Vec<String> = relative
            .iter()
            .map(|part| part.to_string_lossy().into_owned())
            .collect();
        let [dist, arch, file] = parts.as_slice() else {
            return Ok(None);
        };

        let arch = match Arch::from_str(arch) {
            Ok(arch) => arch,
            Err(_) => {
                warn!("Skipping {}: unknown architecture {arch}", path.display());
                return Ok(None);
            }
        };

        let metadata = fs::metadata(path)?;
        let added = metadata
            .modified()
            .ok()
            .and_then(|m| m.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();

        let name = file
            .strip_suffix(&format!(".{ARCHIVE_EXTENSION}"))
            .unwrap_or(file)
            .to_string();

        Ok(Some(Artifact {
            info: VersionInfo {
                eol: self.eol.contains(&name),
                name,
                file: file.clone(),
                path: format!("{dist}/{arch}"),
                size: metadata.len(),
                hash: String::new(),
                added,
                variations: Vec::new(),
            },
            dist: dist.clone(),
            arch,
            full_path: path.to_path_buf(),
        }))
    }

    fn digest(&self, artifact: &Artifact) -> Result<String> {
        if let Some(hash) = self.reusable_hash(artifact) {
            debug!("Reusing hash of {}", artifact.info.file);
            return Ok(hash);
        }
        info!("Hashing {}", artifact.full_path.display());
        calculate_sha256(&artifact.full_path)
    }

    /// Hash from the previous index when the archive looks unchanged.
    fn reusable_hash(&self, artifact: &Artifact) -> Option<String> {
        let previous = self.previous.as_ref()?;
        let (old, _) = previous.find(&artifact.dist, artifact.arch, &artifact.info.name)?;
        let info = &artifact.info;

        (old.added == info.added
            && old.size == info.size
            && old.path == info.path
            && !old.hash.is_empty())
        .then(|| old.hash.clone())
    }
}

/// Attach flavoured builds to the version they extend.
fn nest_variations(mut versions: Vec<VersionInfo>) -> Vec<VersionInfo> {
    let names: Vec<String> = versions.iter().map(|v| v.name.clone()).collect();
    let mut bases: BTreeMap<String, String> = BTreeMap::new();

    for name in &names {
        let base = names
            .iter()
            .filter(|candidate| is_variation_of(name, candidate))
            .max_by_key(|candidate| candidate.len());
        if let Some(base) = base {
            bases.insert(name.clone(), base.clone());
        }
    }

    let (variations, mut tops): (Vec<_>, Vec<_>) =
        versions.drain(..).partition(|v| bases.contains_key(&v.name));

    for variation in variations {
        let Some(mut base) = bases.get(&variation.name) else {
            continue;
        };
        // Variations of variations hang off the top-level version
        while let Some(parent) = bases.get(base) {
            base = parent;
        }
        if let Some(top) = tops.iter_mut().find(|t| &t.name == base) {
            top.variations.push(variation);
        }
    }

    tops
}

/// Version qualifiers that never name a build flavour
const PRERELEASE_TAGS: &[&str] = &["alpha", "beta", "dev", "preview", "rc"];

/// `2.1.5-jemalloc` is a variation of `2.1.5`; `2.1.5-p0`, `2.3.0-preview1`
/// and `2.3.0-rc1` are not.
///
/// A flavour's first segment is purely alphabetic. Segments carrying a number
/// are patch levels or prerelease counters.
pub fn is_variation_of(name: &str, base: &str) -> bool {
    let Some(flavour) = name.strip_prefix(base).and_then(|rest| rest.strip_prefix('-')) else {
        return false;
    };

    let first = flavour.split('-').next().unwrap_or_default();
    !first.is_empty()
        && first.chars().all(|c| c.is_ascii_alphabetic())
        && !PRERELEASE_TAGS.contains(&first.to_ascii_lowercase().as_str())
}

/// Load a previously written index, if there is one.
pub fn load_previous(path: &Path) -> Result<Option<Index>> {
    match fs::read(path) {
        Ok(data) => Ok(Some(Index::decode(&data)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Encode `index` and atomically replace `path` with it.
pub fn write_index(index: &mut Index, path: &Path) -> Result<()> {
    let data = index.encode()?;
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    std::io::Write::write_all(&mut temp, &data)?;
    temp.persist(path).map_err(|e| RbinstallError::Io(e.error))?;
    Ok(())
}

/// Default output location inside the data directory
pub fn default_output(data_dir: &Path) -> PathBuf {
    data_dir.join(INDEX_FILE_NAME)
}
