//! Reconciles free-text region names with PSGC regions.
//!
//! Wage orders name regions loosely ("NCR", "Region 4-A", "Region IV-A
//! (CALABARZON)"); the PSGC API uses official names and codes. Both sides
//! are reduced to sets of normalized keys and a region matches when the sets
//! intersect.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A region as returned by the PSGC API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// 9 or 10 digit PSGC code.
    pub code: String,
    /// Official name (e.g. "National Capital Region").
    pub name: String,
    /// Short or numbered name (e.g. "NCR", "Region IV-A").
    #[serde(rename = "regionName", default)]
    pub region_name: String,
}

/// Groups of names that refer to the same region.
const ALIASES: &[&[&str]] = &[
    &["ncr", "national capital region", "metro manila", "metropolitan manila"],
    &["car", "cordillera administrative region", "cordillera"],
    &[
        "barmm",
        "armm",
        "bangsamoro",
        "bangsamoro autonomous region in muslim mindanao",
        "autonomous region in muslim mindanao",
    ],
    &["mimaropa", "region iv b", "southwestern tagalog region"],
    &["calabarzon", "region iv a"],
    &["soccsksargen", "region xii"],
    &["caraga", "region xiii"],
];

const ROMAN: [&str; 13] = [
    "i", "ii", "iii", "iv", "v", "vi", "vii", "viii", "ix", "x", "xi", "xii", "xiii",
];

/// Finds the region a free-text name refers to.
///
/// Accepts a PSGC code, an official name, a short name, a parenthetical
/// abbreviation, a known alias, or "Region N" with N in Arabic or Roman
/// numerals. Returns `None` when nothing matches.
///
/// # Examples
///
/// ```
/// use hris::psgc::{Region, match_region};
///
/// let regions = vec![Region {
///     code: "040000000".to_string(),
///     name: "Calabarzon".to_string(),
///     region_name: "Region IV-A".to_string(),
/// }];
/// assert!(match_region("Region 4-A", &regions).is_some());
/// assert!(match_region("Region IV-A (CALABARZON)", &regions).is_some());
/// assert!(match_region("Region V", &regions).is_none());
/// ```
pub fn match_region<'r>(query: &str, regions: &'r [Region]) -> Option<&'r Region> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    if let Some(region) = regions.iter().find(|r| r.code == query) {
        return Some(region);
    }

    let wanted = keys_for(query);
    if wanted.is_empty() {
        return None;
    }
    regions.iter().find(|region| {
        let mut keys = keys_for(&region.name);
        keys.extend(keys_for(&region.region_name));
        !keys.is_disjoint(&wanted)
    })
}

/// Every normalized key a name can be known by.
fn keys_for(text: &str) -> HashSet<String> {
    let mut raw = vec![text.to_string()];
    let (outside, inside) = split_parenthetical(text);
    raw.push(outside);
    raw.extend(inside);

    let mut keys = HashSet::new();
    for candidate in raw {
        let normalized = normalize(&candidate);
        if normalized.is_empty() {
            continue;
        }
        if let Some(stripped) = normalized.strip_suffix(" region") {
            if !stripped.is_empty() && !stripped.starts_with("region") {
                keys.insert(stripped.to_string());
            }
        }
        keys.insert(romanize(&normalized));
        keys.insert(normalized);
    }

    let aliases: Vec<&str> = ALIASES
        .iter()
        .filter(|group| group.iter().any(|alias| keys.contains(*alias)))
        .flat_map(|group| group.iter().copied())
        .collect();
    keys.extend(aliases.into_iter().map(str::to_string));
    keys
}

/// Splits "Region IV-A (CALABARZON)" into the text outside and inside parentheses.
fn split_parenthetical(text: &str) -> (String, Vec<String>) {
    let mut outside = String::new();
    let mut inside = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in text.chars() {
        match c {
            '(' => {
                depth += 1;
                if depth == 1 {
                    current.clear();
                }
            }
            ')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    inside.push(std::mem::take(&mut current));
                }
            }
            _ if depth > 0 => current.push(c),
            _ => outside.push(c),
        }
    }
    (outside, inside)
}

/// Lowercases, turns punctuation into spaces and splits digit/letter runs.
fn normalize(text: &str) -> String {
    let mut spaced = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    for c in text.chars().flat_map(char::to_lowercase) {
        let c = if c.is_alphanumeric() { c } else { ' ' };
        if let Some(p) = prev {
            if c != ' ' && p != ' ' && p.is_ascii_digit() != c.is_ascii_digit() {
                spaced.push(' ');
            }
        }
        spaced.push(c);
        prev = Some(c);
    }
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Rewrites "region 4 a" as "region iv a".
fn romanize(normalized: &str) -> String {
    let mut words: Vec<&str> = normalized.split(' ').collect();
    if words.len() >= 2 && words[0] == "region" {
        if let Ok(n) = words[1].parse::<usize>() {
            if (1..=ROMAN.len()).contains(&n) {
                words[1] = ROMAN[n - 1];
            }
        }
    }
    words.join(" ")
}
