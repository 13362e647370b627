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

/// Configuration for a progress indicator operation
#[derive(Debug, Clone)]
pub struct ProgressConfig {
    /// Operation name (e.g., "Downloading", "Mirroring")
    pub operation: String,

    /// Context-specific message (e.g., "2.1.5.7z")
    pub context: String,

    /// Total units for determinate operations (None for indeterminate/spinner)
    pub total: Option<u64>,

    /// Display style
    pub style: ProgressStyle,
}

impl ProgressConfig {
    pub fn new(
        operation: impl Into<String>,
        context: impl Into<String>,
        style: ProgressStyle,
    ) -> Self {
        Self {
            operation: operation.into(),
            context: context.into(),
            total: None,
            style,
        }
    }

    /// Sets the total for determinate operations
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }
}

/// Progress display style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressStyle {
    /// Progress bar with bytes display (for downloads)
    #[default]
    Bytes,
    /// Progress bar with count display (for mirroring many files)
    Count,
}
