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

use crate::indicator::{IndicatifProgress, ProgressIndicator, SilentProgress};
use std::env;
use std::io::IsTerminal;

pub struct ProgressFactory;

impl ProgressFactory {
    pub fn create(no_progress: bool) -> Box<dyn ProgressIndicator> {
        if no_progress || !Self::is_interactive() {
            Box::new(SilentProgress::new())
        } else {
            Box::new(IndicatifProgress::new())
        }
    }

    /// Animated output is only useful on a real terminal.
    pub fn is_interactive() -> bool {
        if !std::io::stderr().is_terminal() {
            return false;
        }

        !matches!(env::var("TERM").as_deref(), Ok("dumb") | Ok(""))
    }
}
