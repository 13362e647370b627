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

use crate::context::Context;
use crate::error::Result;
use crate::task::Task;
use colored::Colorize;

pub struct RehashCommand<'a> {
    ctx: &'a Context,
}

impl<'a> RehashCommand<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    pub fn execute(&self) -> Result<()> {
        let rbenv = self.ctx.rbenv();
        rbenv.preflight()?;

        Task::new("Rehashing shims", self.ctx.options.spinner).run(|| rbenv.rehash())?;
        println!("{}", "Shims successfully rehashed!".green());
        Ok(())
    }
}
