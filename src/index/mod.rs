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

//! Repository index: `dist -> arch -> category -> [version]`.
//!
//! The same model is read by the installer and the mirror cloner and written
//! by the index generator, so the JSON layout produced by [`Index::encode`] is
//! the on-disk contract of a repository.

pub mod version;

use crate::error::{RbinstallError, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path};
use std::str::FromStr;

pub use version::{compare_versions, sort_names};

pub const INDEX_FILE_NAME: &str = "index.json";

/// Build flavour group. The declaration order is the column order of the
/// listing view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Ruby,
    Jruby,
    Ree,
    Rubinius,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Ruby,
        Category::Jruby,
        Category::Ree,
        Category::Rubinius,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ruby => "ruby",
            Category::Jruby => "jruby",
            Category::Ree => "ree",
            Category::Rubinius => "rubinius",
            Category::Other => "other",
        }
    }

    /// Infer the category from an artifact or version name
    pub fn from_name(name: &str) -> Category {
        if name.starts_with("jruby-") {
            Category::Jruby
        } else if name.starts_with("ree-") {
            Category::Ree
        } else if name.starts_with("rbx-") || name.starts_with("rubinius-") {
            Category::Rubinius
        } else if name.starts_with(|c: char| c.is_ascii_digit()) {
            Category::Ruby
        } else {
            Category::Other
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = RbinstallError;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| RbinstallError::ValidationError(format!("Unknown category: {s}")))
    }
}

/// Architecture tag used as the second level of the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    X32,
    X64,
    Arm,
}

impl Arch {
    pub const ALL: [Arch; 3] = [Arch::X32, Arch::X64, Arch::Arm];

    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X32 => "x32",
            Arch::X64 => "x64",
            Arch::Arm => "arm",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = RbinstallError;

    fn from_str(s: &str) -> Result<Self> {
        Arch::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| RbinstallError::UnsupportedArchitecture(s.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// Unix time of the last encode
    pub created: i64,
    /// Sum of every artifact size, variations included
    pub size: u64,
    /// Number of versions, variations included
    pub items: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub name: String,
    pub file: String,
    pub path: String,
    pub size: u64,
    pub hash: String,
    pub added: i64,

    #[serde(default, skip_serializing_if = "is_false")]
    pub eol: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variations: Vec<VersionInfo>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl VersionInfo {
    /// Location of the artifact relative to the storage root
    pub fn relative_path(&self) -> String {
        if self.path.is_empty() {
            self.file.clone()
        } else {
            format!("{}/{}", self.path.trim_matches('/'), self.file)
        }
    }

    /// Full download URL of the artifact
    pub fn url(&self, storage_url: &str) -> String {
        format!(
            "{}/{}",
            storage_url.trim_end_matches('/'),
            self.relative_path()
        )
    }

    /// Reject entries that can't be fetched or would escape the storage root.
    pub fn validate(&self) -> Result<()> {
        if self.file.is_empty() || self.hash.is_empty() {
            return Err(RbinstallError::InvalidIndex(format!(
                "version {} has no file name or hash",
                self.name
            )));
        }

        let escapes = |value: &str| {
            Path::new(value)
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        };

        if escapes(&self.path) || escapes(&self.file) || self.file.contains('/') {
            return Err(RbinstallError::InvalidIndex(format!(
                "version {} has unsafe path {}",
                self.name,
                self.relative_path()
            )));
        }

        Ok(())
    }

    /// The entry itself followed by its variations
    pub fn with_variations(&self) -> impl Iterator<Item = &VersionInfo> {
        std::iter::once(self).chain(self.variations.iter())
    }
}

pub type CategoryMap = BTreeMap<Category, Vec<VersionInfo>>;
pub type ArchMap = BTreeMap<Arch, CategoryMap>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub meta: Meta,
    pub data: BTreeMap<String, ArchMap>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a version, creating the intermediate maps on demand.
    ///
    /// Callers are responsible for not adding the same name twice.
    pub fn add(&mut self, dist: &str, arch: Arch, category: Category, info: VersionInfo) {
        self.data
            .entry(dist.to_string())
            .or_default()
            .entry(arch)
            .or_default()
            .entry(category)
            .or_default()
            .push(info);
    }

    /// Look a version or variation up by name.
    pub fn find(&self, dist: &str, arch: Arch, name: &str) -> Option<(&VersionInfo, Category)> {
        let categories = self.data.get(dist)?.get(&arch)?;

        for (category, versions) in categories {
            for version in versions {
                if let Some(found) = version.with_variations().find(|v| v.name == name) {
                    return Some((found, *category));
                }
            }
        }

        None
    }

    pub fn has_data(&self, dist: &str, arch: Arch) -> bool {
        self.data
            .get(dist)
            .and_then(|archs| archs.get(&arch))
            .is_some_and(|categories| !categories.is_empty())
    }

    /// Versions of one category, empty when the branch doesn't exist
    pub fn versions(&self, dist: &str, arch: Arch, category: Category) -> &[VersionInfo] {
        self.data
            .get(dist)
            .and_then(|archs| archs.get(&arch))
            .and_then(|categories| categories.get(&category))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterate over every top-level version in the tree with its coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Arch, Category, &VersionInfo)> {
        self.data.iter().flat_map(|(dist, archs)| {
            archs.iter().flat_map(move |(arch, categories)| {
                categories.iter().flat_map(move |(category, versions)| {
                    versions
                        .iter()
                        .map(move |version| (dist.as_str(), *arch, *category, version))
                })
            })
        })
    }

    pub fn sort(&mut self) {
        for archs in self.data.values_mut() {
            for categories in archs.values_mut() {
                for versions in categories.values_mut() {
                    versions.sort_by(|a, b| compare_versions(&a.name, &b.name));
                    for version in versions.iter_mut() {
                        version
                            .variations
                            .sort_by(|a, b| compare_versions(&a.name, &b.name));
                    }
                }
            }
        }
    }

    /// Recompute `items` and `size` from scratch and stamp `created`.
    pub fn update_metadata(&mut self) {
        let mut items = 0;
        let mut size = 0;

        for (_, _, _, version) in self.iter() {
            for info in version.with_variations() {
                items += 1;
                size += info.size;
            }
        }

        self.meta = Meta {
            created: Utc::now().timestamp(),
            size,
            items,
        };
    }

    /// Sort, refresh metadata and render the canonical two-space indented JSON.
    pub fn encode(&mut self) -> Result<Vec<u8>> {
        self.sort();
        self.update_metadata();

        let mut data = serde_json::to_vec_pretty(self)?;
        data.push(b'\n');
        Ok(data)
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).map_err(|e| RbinstallError::InvalidIndex(e.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.data.values().all(|archs| {
            archs
                .values()
                .all(|categories| categories.values().all(Vec::is_empty))
        })
    }
}
