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

//! Remote fetcher for the repository index and version archives.
//!
//! All traffic goes through the [`HttpClient`] trait so the installer and the
//! mirror cloner can be exercised against mock clients or a local server.

mod client;
mod http_file_downloader;
mod progress;

pub use client::{AttohttpcClient, DEFAULT_TIMEOUT, HttpClient, HttpResponse};
pub use http_file_downloader::{HttpFileDownloader, ProgressReader, ProgressReporter};
pub use progress::DownloadProgressAdapter;

use crate::config::RbinstallConfig;
use crate::error::Result;

/// Build a downloader honoring the configured proxy.
pub fn downloader_for(config: &RbinstallConfig, user_agent: String) -> Result<HttpFileDownloader> {
    let client = AttohttpcClient::new()
        .with_user_agent(user_agent)
        .with_proxy(config.proxy_url())?;
    Ok(HttpFileDownloader::with_client(Box::new(client)))
}
