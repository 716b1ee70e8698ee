use std::collections::HashMap;

use crate::model::{LocationNode, TechnicalLocation};

use super::CODE_SEPARATOR;

/// Flatten a forest into pre-order records (node before its descendants).
pub fn flatten(nodes: &[LocationNode]) -> Vec<TechnicalLocation> {
    let mut out = Vec::with_capacity(node_count(nodes));
    let mut stack: Vec<&LocationNode> = nodes.iter().rev().collect();
    while let Some(node) = stack.pop() {
        out.push(node.location.clone());
        stack.extend(node.children.iter().rev());
    }
    out
}

/// Total number of nodes in a forest.
pub fn node_count(nodes: &[LocationNode]) -> usize {
    nodes.iter().map(|n| 1 + descendant_count(n)).sum()
}

/// Number of descendants below `node` (not counting itself).
pub fn descendant_count(node: &LocationNode) -> usize {
    node.children.len() + node.children.iter().map(descendant_count).sum::<usize>()
}

fn parent_code(code: &str) -> Option<&str> {
    code.rsplit_once(CODE_SEPARATOR).map(|(parent, _)| parent)
}

/// Rebuild a forest from flat records, linking each record to the record
/// whose code is its own minus the last segment.
///
/// Sibling order follows input order. Records whose parent is not in the
/// list become roots.
pub fn rebuild(flat: &[TechnicalLocation]) -> Vec<LocationNode> {
    let by_code: HashMap<&str, usize> = flat
        .iter()
        .enumerate()
        .map(|(i, loc)| (loc.code.as_str(), i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); flat.len()];
    let mut roots = Vec::new();
    for (i, loc) in flat.iter().enumerate() {
        match parent_code(&loc.code).and_then(|p| by_code.get(p)) {
            Some(&parent) if parent != i => children[parent].push(i),
            _ => roots.push(i),
        }
    }

    fn build(i: usize, flat: &[TechnicalLocation], children: &[Vec<usize>]) -> LocationNode {
        LocationNode {
            location: flat[i].clone(),
            children: children[i].iter().map(|&c| build(c, flat, children)).collect(),
        }
    }

    roots.into_iter().map(|i| build(i, flat, &children)).collect()
}

/// A structural problem found by [`check_consistency`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inconsistency {
    pub code: String,
    pub message: String,
}

/// Check that every child's code extends its parent's code by its own
/// abbreviation and that levels increase by one per edge.
pub fn check_consistency(nodes: &[LocationNode]) -> Vec<Inconsistency> {
    fn walk(node: &LocationNode, out: &mut Vec<Inconsistency>) {
        let parent = &node.location;
        for child in &node.children {
            let loc = &child.location;
            let expected = format!("{}{}{}", parent.code, CODE_SEPARATOR, loc.abbreviation);
            if loc.code != expected {
                out.push(Inconsistency {
                    code: loc.code.clone(),
                    message: format!("expected code {expected}"),
                });
            }
            if parent.level.checked_add(1) != Some(loc.level) {
                out.push(Inconsistency {
                    code: loc.code.clone(),
                    message: format!("level {} under parent level {}", loc.level, parent.level),
                });
            }
            walk(child, out);
        }
    }

    let mut out = Vec::new();
    for node in nodes {
        walk(node, &mut out);
    }
    out
}

/// Locations of one module (first code segment).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleGroup {
    pub module: String,
    pub locations: Vec<TechnicalLocation>,
}

impl ModuleGroup {
    pub fn count(&self) -> usize {
        self.locations.len()
    }
}

/// Group flat records by their module, in order of first appearance.
pub fn group_by_module(flat: &[TechnicalLocation]) -> Vec<ModuleGroup> {
    let mut groups: Vec<ModuleGroup> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for loc in flat {
        let module = loc.code.split(CODE_SEPARATOR).next().unwrap_or_default();
        let slot = *index.entry(module).or_insert_with(|| {
            groups.push(ModuleGroup {
                module: module.to_string(),
                locations: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].locations.push(loc.clone());
    }
    groups
}

/// Find a node by id anywhere in the forest.
pub fn find(nodes: &[LocationNode], id: i64) -> Option<&LocationNode> {
    nodes.iter().find_map(|n| {
        if n.location.id == id {
            Some(n)
        } else {
            find(&n.children, id)
        }
    })
}
