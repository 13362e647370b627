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

use crate::download::client::{AttohttpcClient, HttpClient, HttpResponse};
use crate::error::{RbinstallError, Result};
use crate::index::{INDEX_FILE_NAME, Index};
use log::debug;
use std::fs;
use std::io::{self, BufWriter, Read};
use std::path::Path;
use tempfile::NamedTempFile;

/// Receives byte counts as a body streams to disk.
///
/// Counts are monotonically increasing and delivered on the downloading thread.
pub trait ProgressReporter: Send + Sync {
    fn on_start(&mut self, total_bytes: u64);

    fn on_progress(&mut self, bytes_downloaded: u64);

    fn on_complete(&mut self);
}

/// Reader interposed between a response body and its destination.
pub struct ProgressReader<'a, R> {
    inner: R,
    reporter: Option<&'a mut dyn ProgressReporter>,
    transferred: u64,
}

impl<'a, R: Read> ProgressReader<'a, R> {
    pub fn new(inner: R, reporter: Option<&'a mut dyn ProgressReporter>) -> Self {
        Self {
            inner,
            reporter,
            transferred: 0,
        }
    }

    pub fn transferred(&self) -> u64 {
        self.transferred
    }
}

impl<R: Read> Read for ProgressReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.transferred += n as u64;
            if let Some(reporter) = self.reporter.as_deref_mut() {
                reporter.on_progress(self.transferred);
            }
        }
        Ok(n)
    }
}

pub struct HttpFileDownloader {
    pub(crate) http_client: Box<dyn HttpClient>,
    progress_reporter: Option<Box<dyn ProgressReporter>>,
}

impl Default for HttpFileDownloader {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFileDownloader {
    pub fn new() -> Self {
        Self::with_client(Box::new(AttohttpcClient::new()))
    }

    pub fn with_client(http_client: Box<dyn HttpClient>) -> Self {
        Self {
            http_client,
            progress_reporter: None,
        }
    }

    pub fn with_progress_reporter(mut self, reporter: Box<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Issue a GET request. Any status other than 200 is an error.
    pub fn get(&self, url: &str) -> Result<Box<dyn HttpResponse>> {
        let response = self.http_client.get(url)?;
        let status = response.status();
        if status != 200 {
            return Err(RbinstallError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }

    /// Stream `url` into `destination`, returning the number of bytes written.
    ///
    /// The body is written to a temporary file next to `destination` and
    /// renamed into place once complete, so a failed transfer leaves nothing
    /// behind.
    pub fn download(&mut self, url: &str, destination: &Path) -> Result<u64> {
        let parent = destination.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let response = self.get(url)?;
        let total_size = response.content_length().unwrap_or(0);
        debug!("Downloading {url} ({total_size} bytes) to {}", destination.display());

        if let Some(reporter) = &mut self.progress_reporter {
            reporter.on_start(total_size);
        }

        let temp_file = NamedTempFile::new_in(parent)?;
        let mut writer = BufWriter::new(temp_file);
        let reporter = self
            .progress_reporter
            .as_mut()
            .map(|r| r.as_mut() as &mut dyn ProgressReporter);
        let mut reader = ProgressReader::new(response, reporter);
        io::copy(&mut reader, &mut writer)?;
        let written = reader.transferred();

        let temp_file = writer.into_inner().map_err(|e| e.into_error())?;
        temp_file.persist(destination).map_err(|e| e.error)?;

        if let Some(reporter) = &mut self.progress_reporter {
            reporter.on_complete();
        }

        Ok(written)
    }

    /// Fetch and decode `<storage_url>/index.json`.
    pub fn fetch_index(&self, storage_url: &str) -> Result<Index> {
        let url = format!("{}/{INDEX_FILE_NAME}", storage_url.trim_end_matches('/'));
        let response = self.get(&url)?;
        let index: Index = serde_json::from_reader(io::BufReader::new(response))
            .map_err(|e| RbinstallError::InvalidIndex(e.to_string()))?;
        debug!("Fetched index with {} items", index.meta.items);
        Ok(index)
    }
}

#[cfg(test)]
#[path = "http_file_downloader_tests.rs"]
mod http_file_downloader_tests;
