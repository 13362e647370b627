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

//! Progress indicator module for download feedback
//!
//! Downloads report through a [`ProgressIndicator`]. The concrete renderer is
//! picked by [`ProgressFactory`]: an animated bar on a terminal, nothing when
//! progress is disabled or output is redirected.

pub mod factory;
pub mod indicatif;
pub mod silent;
pub mod types;

pub use factory::ProgressFactory;
pub use indicatif::IndicatifProgress;
pub use silent::SilentProgress;
pub use types::{ProgressConfig, ProgressStyle};

/// Core trait for progress indicator implementations
pub trait ProgressIndicator: Send + Sync {
    /// Start a new progress operation
    ///
    /// For determinate operations (with total), a progress bar is shown.
    /// For indeterminate operations (without total), a spinner is shown.
    fn start(&mut self, config: ProgressConfig);

    /// Update progress for determinate operations
    fn update(&mut self, current: u64, total: Option<u64>);

    /// Complete the progress operation successfully
    fn complete(&mut self, message: Option<String>);

    /// Handle error completion
    fn error(&mut self, message: String);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mock implementation for testing the trait
    #[derive(Default)]
    struct MockProgress {
        started: bool,
        current: u64,
        total: Option<u64>,
        message: String,
        completed: bool,
        errored: bool,
    }

    impl ProgressIndicator for MockProgress {
        fn start(&mut self, config: ProgressConfig) {
            self.started = true;
            self.total = config.total;
            self.message = format!("{} {}", config.operation, config.context);
        }

        fn update(&mut self, current: u64, total: Option<u64>) {
            self.current = current;
            if total.is_some() {
                self.total = total;
            }
        }

        fn complete(&mut self, message: Option<String>) {
            self.completed = true;
            if let Some(msg) = message {
                self.message = msg;
            }
        }

        fn error(&mut self, message: String) {
            self.errored = true;
            self.message = message;
        }
    }

    #[test]
    fn test_trait_implementation() {
        let mut progress = MockProgress::default();

        let config =
            ProgressConfig::new("Downloading", "2.1.5.7z", ProgressStyle::Bytes).with_total(100);
        progress.start(config);
        assert!(progress.started);
        assert_eq!(progress.total, Some(100));
        assert_eq!(progress.message, "Downloading 2.1.5.7z");

        progress.update(50, None);
        assert_eq!(progress.current, 50);
        assert_eq!(progress.total, Some(100));

        progress.complete(Some("Done!".to_string()));
        assert!(progress.completed);
        assert_eq!(progress.message, "Done!");
    }

    #[test]
    fn test_error_handling() {
        let mut progress = MockProgress::default();
        progress.start(ProgressConfig::new("Downloading", "x", ProgressStyle::Bytes));
        progress.error("Something went wrong".to_string());
        assert!(progress.errored);
        assert_eq!(progress.message, "Something went wrong");
    }

    #[test]
    fn test_trait_object() {
        fn accept_progress(_p: Box<dyn ProgressIndicator>) {}
        accept_progress(Box::new(MockProgress::default()));
    }

    #[test]
    fn test_indicator_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn ProgressIndicator>();
        assert_send_sync::<crate::download::DownloadProgressAdapter>();

        let progress: Box<dyn ProgressIndicator> = ProgressFactory::create(true);
        std::thread::scope(|scope| {
            let shared = &progress;
            scope.spawn(move || {
                std::hint::black_box(shared);
            });
        });
    }
}
