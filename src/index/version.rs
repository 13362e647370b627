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

//! Version ordering used by the repository index and the listing view.
//!
//! Names are split on `.` and `-` (a dash counts as a component separator),
//! numeric components compare by value, everything else lexicographically,
//! and a name that is a prefix of another sorts first.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Component<'a> {
    Number(u64),
    Text(&'a str),
}

impl Ord for Component<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Component::Number(a), Component::Number(b)) => a.cmp(b),
            (Component::Text(a), Component::Text(b)) => a.cmp(b),
            (Component::Number(_), Component::Text(_)) => Ordering::Less,
            (Component::Text(_), Component::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Component<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn components(name: &str) -> impl Iterator<Item = Component<'_>> {
    name.split(['.', '-']).map(|part| match part.parse::<u64>() {
        Ok(number) if !part.is_empty() => Component::Number(number),
        _ => Component::Text(part),
    })
}

/// Compare two version names using the index sort key.
///
/// Names with equal keys fall back to plain string order so the result is a
/// total order.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = components(a);
    let mut right = components(b);

    loop {
        match (left.next(), right.next()) {
            (Some(l), Some(r)) => match l.cmp(&r) {
                Ordering::Equal => continue,
                other => return other,
            },
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (None, None) => return a.cmp(b),
        }
    }
}

/// Sort a list of names in place with [`compare_versions`].
pub fn sort_names<S: AsRef<str>>(names: &mut [S]) {
    names.sort_by(|a, b| compare_versions(a.as_ref(), b.as_ref()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_levels_sort_between_releases() {
        let mut names = vec![
            "2.0.0-p594",
            "2.0.0-p598",
            "2.0.0",
            "2.0.1",
            "1.9.3-p551",
            "2.0.0-p598-railsexpress",
        ];
        sort_names(&mut names);

        assert_eq!(
            names,
            vec![
                "1.9.3-p551",
                "2.0.0",
                "2.0.0-p594",
                "2.0.0-p598",
                "2.0.0-p598-railsexpress",
                "2.0.1",
            ]
        );
    }

    #[test]
    fn test_numeric_components_compare_by_value() {
        assert_eq!(compare_versions("2.10.0", "2.9.0"), Ordering::Greater);
        assert_eq!(compare_versions("jruby-1.7.9", "jruby-1.7.16"), Ordering::Less);
        assert_eq!(compare_versions("jruby-9.0.0.0", "jruby-1.7.16"), Ordering::Greater);
    }

    #[test]
    fn test_dash_equals_dot() {
        // Same key, resolved by the string tie-break
        assert_ne!(compare_versions("2.0.0-p0", "2.0.0.p0"), Ordering::Equal);
        assert_eq!(
            compare_versions("2.0.0-p0", "2.0.1"),
            compare_versions("2.0.0.p0", "2.0.1")
        );
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(compare_versions("2.1", "2.1.0"), Ordering::Less);
        assert_eq!(compare_versions("2.1.0", "2.1"), Ordering::Greater);
        assert_eq!(compare_versions("2.1.0", "2.1.0"), Ordering::Equal);
    }

    #[test]
    fn test_numbers_sort_before_text() {
        assert_eq!(compare_versions("2.0.0-1", "2.0.0-p0"), Ordering::Less);
        assert_eq!(compare_versions("rbx-2.5.2", "2.5.2"), Ordering::Greater);
    }

    #[test]
    fn test_huge_numbers_fall_back_to_text() {
        assert_eq!(
            compare_versions("1.99999999999999999999999", "1.99999999999999999999999"),
            Ordering::Equal
        );
        assert_eq!(compare_versions("1.2", "1.99999999999999999999999"), Ordering::Less);
    }
}
