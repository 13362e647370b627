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

//! Rendering the versions available for the current platform.
//!
//! Raw mode prints one name per line. Pretty mode prints one column per
//! category with installed-state markers next to each name.

use crate::index::{Category, Index, VersionInfo, sort_names};
use crate::platform::Platform;
use colored::{Color, Colorize};
use std::collections::BTreeSet;

/// Width used when the terminal is unknown or very wide
pub const DEFAULT_COLUMN_WIDTH: usize = 28;
const WIDE_TERMINAL: usize = 150;
const TERMINAL_MARGIN: usize = 10;
/// Room taken by the separator and the two markers
const MARKERS_WIDTH: usize = 4;

const INSTALLED: &str = "●";
const AVAILABLE: &str = "○";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Version {
        name: String,
        installed: bool,
    },
    Variation {
        name: String,
        base_installed: bool,
        installed: bool,
    },
}

impl Entry {
    pub fn name(&self) -> &str {
        match self {
            Entry::Version { name, .. } | Entry::Variation { name, .. } => name,
        }
    }

    /// Width the entry needs in a column
    pub fn width(&self) -> usize {
        self.name().chars().count() + MARKERS_WIDTH
    }

    fn plain_len(&self) -> usize {
        match self {
            Entry::Version { name, .. } => name.chars().count() + 2,
            Entry::Variation { name, .. } => name.chars().count() + 3,
        }
    }

    fn render(&self, color: Color) -> String {
        match self {
            Entry::Version { name, installed } => {
                format!("{} {}", name.color(color), marker(*installed))
            }
            Entry::Variation {
                name,
                base_installed,
                installed,
            } => format!(
                "{} {}{}",
                name.color(color),
                marker(*base_installed),
                marker(*installed)
            ),
        }
    }
}

fn marker(installed: bool) -> String {
    if installed {
        INSTALLED.green().to_string()
    } else {
        AVAILABLE.dimmed().to_string()
    }
}

pub fn category_color(category: Category) -> Color {
    match category {
        Category::Ruby => Color::Red,
        Category::Jruby => Color::Yellow,
        Category::Ree => Color::Green,
        Category::Rubinius => Color::Blue,
        Category::Other => Color::Magenta,
    }
}

/// Entries of one listing column
#[derive(Debug, Clone)]
pub struct CategoryData {
    pub category: Category,
    pub entries: Vec<Entry>,
}

fn visible(version: &VersionInfo, all: bool) -> bool {
    all || !version.eol
}

/// Collect one column per category, in listing order.
pub fn gather(
    index: &Index,
    platform: &Platform,
    installed: &BTreeSet<String>,
    all: bool,
) -> Vec<CategoryData> {
    Category::ALL
        .iter()
        .map(|&category| {
            let mut entries = Vec::new();
            for version in index.versions(&platform.dist, platform.arch, category) {
                if !visible(version, all) {
                    continue;
                }
                let base_installed = installed.contains(&version.name);
                entries.push(Entry::Version {
                    name: version.name.clone(),
                    installed: base_installed,
                });
                for variation in version.variations.iter().filter(|v| visible(v, all)) {
                    entries.push(Entry::Variation {
                        name: variation.name.clone(),
                        base_installed,
                        installed: installed.contains(&variation.name),
                    });
                }
            }
            CategoryData { category, entries }
        })
        .collect()
}

/// Every visible version and variation name, version-sorted.
pub fn raw_names(index: &Index, platform: &Platform, all: bool) -> Vec<String> {
    let mut names: Vec<String> = Category::ALL
        .iter()
        .flat_map(|&category| index.versions(&platform.dist, platform.arch, category))
        .filter(|version| visible(version, all))
        .flat_map(|version| {
            version
                .with_variations()
                .filter(|v| visible(v, all))
                .map(|v| v.name.clone())
        })
        .collect();
    sort_names(&mut names);
    names
}

/// Column widths for `data` on a terminal `term_width` characters wide.
pub fn column_widths(term_width: Option<usize>, data: &[CategoryData]) -> Vec<usize> {
    let columns = data.len();
    let term_width = match term_width {
        Some(width) if width <= WIDE_TERMINAL && columns > 0 => width,
        _ => return vec![DEFAULT_COLUMN_WIDTH; columns],
    };

    let average = term_width.saturating_sub(TERMINAL_MARGIN) / columns;
    let needed: Vec<usize> = data
        .iter()
        .map(|column| column.entries.iter().map(Entry::width).max().unwrap_or(0))
        .collect();

    let grown: usize = needed.iter().filter(|&&need| need > average).sum();
    let narrow = needed.iter().filter(|&&need| need <= average).count();
    let share = if narrow > 0 {
        (average * columns).saturating_sub(grown) / narrow
    } else {
        average
    };

    needed
        .iter()
        .map(|&need| if need > average { need } else { share })
        .collect()
}

/// Header plus rows until every column runs out of entries.
pub fn render_pretty(data: &[CategoryData], widths: &[usize]) -> String {
    let mut output = String::new();

    let header: Vec<String> = data
        .iter()
        .zip(widths)
        .map(|(column, &width)| {
            let title = column.category.as_str();
            pad(
                title.color(category_color(column.category)).bold().to_string(),
                title.len(),
                width,
            )
        })
        .collect();
    output.push_str(header.join("").trim_end());
    output.push('\n');

    let rows = data.iter().map(|c| c.entries.len()).max().unwrap_or(0);
    for row in 0..rows {
        let line: Vec<String> = data
            .iter()
            .zip(widths)
            .map(|(column, &width)| match column.entries.get(row) {
                Some(entry) => pad(
                    entry.render(category_color(column.category)),
                    entry.plain_len(),
                    width,
                ),
                None => " ".repeat(width),
            })
            .collect();
        output.push_str(line.join("").trim_end());
        output.push('\n');
    }

    output
}

fn pad(rendered: String, visible_len: usize, width: usize) -> String {
    let padding = width.saturating_sub(visible_len).max(1);
    format!("{rendered}{}", " ".repeat(padding))
}

pub fn terminal_width() -> Option<usize> {
    term_size::dimensions_stdout().map(|(width, _)| width)
}
