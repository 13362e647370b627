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

//! Cleanup on SIGINT, SIGTERM and SIGQUIT.

use crate::error::Result;
use colored::Colorize;
use log::{debug, warn};
use signal_hook::consts::signal::{SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;

/// Paths removed when the user interrupts the installer.
#[derive(Debug, Clone, Default)]
pub struct CleanupRegistry {
    paths: Arc<Mutex<Vec<PathBuf>>>,
}

impl CleanupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, path: impl Into<PathBuf>) {
        if let Ok(mut paths) = self.paths.lock() {
            paths.push(path.into());
        }
    }

    pub fn unregister(&self, path: &Path) {
        if let Ok(mut paths) = self.paths.lock() {
            paths.retain(|p| p != path);
        }
    }

    pub fn registered(&self) -> Vec<PathBuf> {
        self.paths.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Remove every registered path, newest first.
    pub fn cleanup(&self) {
        for path in self.registered().iter().rev() {
            let removed = if path.is_dir() {
                fs::remove_dir_all(path)
            } else {
                fs::remove_file(path)
            };
            match removed {
                Ok(()) => debug!("Removed {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Can't remove {}: {e}", path.display()),
            }
        }
    }
}

/// Spawn the thread that cleans up and exits when a termination signal arrives.
pub fn install_handler(registry: CleanupRegistry) -> Result<()> {
    let mut signals = Signals::new([SIGINT, SIGTERM, SIGQUIT])?;

    thread::spawn(move || {
        if let Some(signal) = signals.forever().next() {
            debug!("Received signal {signal}");
            registry.cleanup();
            eprintln!("\n{}", "Installation canceled by user".red());
            std::process::exit(1);
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cleanup_removes_registered_paths() {
        let temp = TempDir::new().unwrap();
        let staging = temp.path().join("staging/2.1.5");
        let archive = temp.path().join("2.1.5.7z");
        fs::create_dir_all(staging.join("bin")).unwrap();
        fs::write(&archive, "data").unwrap();

        let registry = CleanupRegistry::new();
        registry.register(&staging);
        registry.register(&archive);
        registry.register(temp.path().join("never-created"));
        registry.cleanup();

        assert!(!staging.exists());
        assert!(!archive.exists());
        assert!(temp.path().join("staging").exists());
    }

    #[test]
    fn test_unregister() {
        let registry = CleanupRegistry::new();
        let clone = registry.clone();
        registry.register("/tmp/a");
        registry.register("/tmp/b");
        clone.unregister(Path::new("/tmp/a"));

        assert_eq!(registry.registered(), vec![PathBuf::from("/tmp/b")]);
    }
}
