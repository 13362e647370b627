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

//! Mirroring a remote repository into a local directory.

use crate::checksum::{calculate_sha256, verify_checksum};
use crate::download::{HttpFileDownloader, downloader_for};
use crate::config::RbinstallConfig;
use crate::error::{RbinstallError, Result};
use crate::index::{INDEX_FILE_NAME, Index, VersionInfo};
use crate::indicator::{ProgressConfig, ProgressFactory, ProgressStyle};
use crate::user_agent;
use indicatif::HumanBytes;
use log::{debug, info};
use retry::{OperationResult, delay::Exponential, retry_with_index};
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const MAX_RETRIES: usize = 3;
const INITIAL_BACKOFF_MS: u64 = 500;

/// What a mirror run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorReport {
    pub downloaded: usize,
    pub skipped: usize,
    pub bytes: u64,
}

pub struct Mirror {
    url: String,
    destination: PathBuf,
    downloader: HttpFileDownloader,
    no_progress: bool,
}

impl Mirror {
    pub fn new(url: &str, destination: impl Into<PathBuf>, config: &RbinstallConfig) -> Result<Self> {
        let downloader = downloader_for(config, user_agent::mirror_client())?;
        Ok(Self::with_downloader(url, destination, downloader))
    }

    pub fn with_downloader(
        url: &str,
        destination: impl Into<PathBuf>,
        downloader: HttpFileDownloader,
    ) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            destination: destination.into(),
            downloader,
            no_progress: false,
        }
    }

    pub fn no_progress(mut self, no_progress: bool) -> Self {
        self.no_progress = no_progress;
        self
    }

    /// Fetch the remote index, refusing an empty repository.
    pub fn fetch_index(&self) -> Result<Index> {
        let index = self.downloader.fetch_index(&self.url)?;
        if index.is_empty() {
            return Err(RbinstallError::EmptyRepository);
        }
        for (_, _, _, version) in index.iter() {
            for info in version.with_variations() {
                info.validate()?;
            }
        }
        Ok(index)
    }

    /// Download every archive of `index` and write the index next to them.
    pub fn clone_index(&mut self, index: &Index) -> Result<MirrorReport> {
        fs::create_dir_all(&self.destination)?;

        let artifacts: Vec<VersionInfo> = index
            .iter()
            .flat_map(|(_, _, _, version)| version.with_variations().cloned().collect::<Vec<_>>())
            .collect();

        let mut progress = ProgressFactory::create(self.no_progress);
        progress.start(
            ProgressConfig::new("Mirroring", &self.url, ProgressStyle::Count)
                .with_total(artifacts.len() as u64),
        );

        let mut report = MirrorReport::default();
        for (done, info) in artifacts.iter().enumerate() {
            let target = self.destination.join(info.relative_path());
            match self.mirror_artifact(info, &target) {
                Ok(Some(bytes)) => {
                    report.downloaded += 1;
                    report.bytes += bytes;
                }
                Ok(None) => report.skipped += 1,
                Err(e) => {
                    progress.error(e.to_string());
                    return Err(e);
                }
            }
            progress.update(done as u64 + 1, None);
        }
        progress.complete(None);

        self.write_index(index)?;
        info!(
            "Mirrored {} into {}: {} downloaded, {} up to date",
            self.url,
            self.destination.display(),
            report.downloaded,
            report.skipped
        );
        Ok(report)
    }

    /// Returns the bytes downloaded, or `None` when the local copy is current.
    fn mirror_artifact(&mut self, info: &VersionInfo, target: &Path) -> Result<Option<u64>> {
        if target.is_file() && calculate_sha256(target)?.eq_ignore_ascii_case(&info.hash) {
            debug!("{} is up to date", target.display());
            return Ok(None);
        }

        let url = info.url(&self.url);
        let downloader = &mut self.downloader;
        let bytes = retry_with_index(
            Exponential::from_millis(INITIAL_BACKOFF_MS).take(MAX_RETRIES),
            |current_try| match downloader.download(&url, target) {
                Ok(bytes) => OperationResult::Ok(bytes),
                // Missing files won't appear by retrying
                Err(e @ RbinstallError::HttpStatus { status: 400..=499, .. }) => {
                    OperationResult::Err(e)
                }
                Err(e) if current_try < MAX_RETRIES as u64 => {
                    debug!("Retrying {url} after: {e}");
                    OperationResult::Retry(e)
                }
                Err(e) => OperationResult::Err(e),
            },
        )
        .map_err(|e| e.error)?;

        if let Err(e) = verify_checksum(target, &info.hash) {
            let _ = fs::remove_file(target);
            return Err(e);
        }
        Ok(Some(bytes))
    }

    fn write_index(&self, index: &Index) -> Result<()> {
        let path = self.destination.join(INDEX_FILE_NAME);
        let mut data = serde_json::to_vec_pretty(index)?;
        data.push(b'\n');

        let mut temp = NamedTempFile::new_in(&self.destination)?;
        temp.write_all(&data)?;
        temp.persist(&path).map_err(|e| RbinstallError::Io(e.error))?;
        Ok(())
    }
}

/// One line per platform branch with its version count.
pub fn describe(index: &Index) -> Vec<String> {
    let mut lines = Vec::new();
    for (dist, archs) in &index.data {
        for (arch, categories) in archs {
            let mut parts = Vec::new();
            for (category, versions) in categories {
                let count: usize = versions.iter().map(|v| 1 + v.variations.len()).sum();
                parts.push(format!("{category}: {count}"));
            }
            lines.push(format!("{dist}/{arch}  {}", parts.join(", ")));
        }
    }
    lines
}

/// `N versions, total size X`
pub fn stats_line(index: &Index) -> String {
    let (items, size) = index
        .iter()
        .flat_map(|(_, _, _, version)| version.with_variations())
        .fold((0usize, 0u64), |(items, size), info| (items + 1, size + info.size));
    format!("{items} versions, total size {}", HumanBytes(size))
}

/// Ask a yes/no question; anything but `y`/`yes` is a no.
pub fn confirm(prompt: &str, input: &mut impl BufRead, output: &mut impl Write) -> Result<bool> {
    write!(output, "{prompt} [y/N] ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests;
