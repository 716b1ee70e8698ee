use std::collections::{BTreeMap, BTreeSet};

use crate::model::{LocationNode, TechnicalLocation};

use super::CODE_SEPARATOR;
use super::code::Level;

/// Sparse per-level filter values, chained strictly root to leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelFilter {
    values: BTreeMap<Level, String>,
}

impl LevelFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value for `level` and clear every deeper level, since their
    /// options depend on this one. An empty value clears `level` as well.
    pub fn select(&mut self, level: Level, value: impl Into<String>) {
        let value = value.into();
        self.values.retain(|l, _| *l < level);
        if !value.is_empty() {
            self.values.insert(level, value);
        }
    }

    pub fn get(&self, level: Level) -> Option<&str> {
        self.values.get(&level).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Level, &str)> {
        self.values.iter().map(|(l, v)| (*l, v.as_str()))
    }

    /// Whether a code satisfies every active constraint position-wise.
    pub fn matches(&self, code: &str) -> bool {
        if self.values.is_empty() {
            return true;
        }
        let segments: Vec<&str> = code.split(CODE_SEPARATOR).collect();
        self.values
            .iter()
            .all(|(level, value)| segments.get(level.index()) == Some(&value.as_str()))
    }
}

/// Distinct segments observed at `target` among records whose upstream
/// segments match the filter values chosen for levels above `target`.
///
/// Filter values at or below `target` are ignored.
pub fn level_options(
    records: &[TechnicalLocation],
    target: Level,
    filter: &LevelFilter,
) -> BTreeSet<String> {
    let mut working: Vec<Vec<&str>> = records
        .iter()
        .map(|r| r.code.split(CODE_SEPARATOR).collect())
        .collect();

    for level in Level::ALL {
        if level >= target {
            break;
        }
        if let Some(value) = filter.get(level) {
            working.retain(|segments| segments.get(level.index()) == Some(&value));
        }
    }

    working
        .iter()
        .filter_map(|segments| segments.get(target.index()))
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Prune a forest to the nodes that match `filter` plus all their ancestors.
pub fn prune(nodes: &[LocationNode], filter: &LevelFilter) -> Vec<LocationNode> {
    if filter.is_empty() {
        return nodes.to_vec();
    }
    nodes
        .iter()
        .filter_map(|node| {
            let children = prune(&node.children, filter);
            if filter.matches(node.code()) || !children.is_empty() {
                Some(LocationNode {
                    location: node.location.clone(),
                    children,
                })
            } else {
                None
            }
        })
        .collect()
}
