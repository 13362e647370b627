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

//! Pipeline steps with a spinner and a one-line outcome.

use crate::error::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::debug;
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const SPINNER_FRAME: Duration = Duration::from_millis(80);

/// One step of a pipeline.
pub struct Task {
    description: String,
    spinner: bool,
}

impl Task {
    pub fn new(description: impl Into<String>, spinner: bool) -> Self {
        Self {
            description: description.into(),
            spinner,
        }
    }

    /// Run `handler`, animating a spinner meanwhile, then print the outcome.
    pub fn run<T>(self, handler: impl FnOnce() -> Result<T>) -> Result<T> {
        self.run_with(&mut io::stdout(), ProgressDrawTarget::stdout(), handler)
    }

    /// Like [`Task::run`], drawing the spinner on `target` and writing the
    /// outcome line to `out`.
    pub fn run_with<T>(
        self,
        out: &mut impl Write,
        target: ProgressDrawTarget,
        handler: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        let started = Instant::now();
        let spinner = self
            .spinner
            .then(|| Spinner::start(&self.description, target));

        let result = handler();

        // The spinner erases itself before the outcome line is printed
        if let Some(spinner) = spinner {
            spinner.stop();
        }

        let outcome = render_outcome(result.is_ok(), &self.description, started.elapsed());
        if let Err(e) = writeln!(out, "{outcome}") {
            debug!("Failed to print outcome of '{}': {e}", self.description);
        }
        result
    }
}

struct Spinner {
    done: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Spinner {
    fn start(description: &str, target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(None, target);
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            bar.set_style(style.tick_chars("⣾⣽⣻⢿⡿⣟⣯⣷ "));
        }
        bar.set_message(description.to_string());

        let done = Arc::new(AtomicBool::new(false));
        let flag = done.clone();
        let handle = thread::spawn(move || {
            while !flag.load(Ordering::Acquire) {
                bar.tick();
                thread::sleep(SPINNER_FRAME);
            }
            bar.finish_and_clear();
        });

        Self { done, handle }
    }

    /// Signal the animator and wait until it has cleared its line.
    fn stop(self) {
        self.done.store(true, Ordering::Release);
        if self.handle.join().is_err() {
            debug!("Spinner thread panicked before clearing its line");
        }
    }
}

pub fn render_outcome(success: bool, description: &str, elapsed: Duration) -> String {
    let elapsed = format!("({})", format_elapsed(elapsed)).dimmed();
    if success {
        format!("{} {description} {elapsed}", "✔".green())
    } else {
        format!("{} {description} {elapsed}", "✖".red())
    }
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{:.2}s", elapsed.as_secs_f64())
    }
}
