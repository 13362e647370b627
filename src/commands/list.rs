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
use crate::listing::{column_widths, gather, raw_names, render_pretty, terminal_width};
use log::debug;

pub struct ListCommand<'a> {
    ctx: &'a Context,
}

impl<'a> ListCommand<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Print the versions available for this platform.
    pub fn execute(&self, raw: bool) -> Result<()> {
        let ctx = self.ctx;
        let all = ctx.options.all;

        if raw {
            for name in raw_names(&ctx.index, &ctx.platform, all) {
                println!("{name}");
            }
            return Ok(());
        }

        if !ctx.index.has_data(&ctx.platform.dist, ctx.platform.arch) {
            println!("No versions available for {}", ctx.platform);
            return Ok(());
        }

        let installed = ctx.rbenv().installed_set()?;
        let data = gather(&ctx.index, &ctx.platform, &installed, all);
        let width = terminal_width();
        let widths = column_widths(width, &data);
        debug!("Terminal width {width:?}, column widths {widths:?}");

        print!("{}", render_pretty(&data, &widths));
        Ok(())
    }
}
