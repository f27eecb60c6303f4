//! Bidirectional dependency adjacency between project manifests
//!
//! Records child -> parent reference edges both ways: a child depends on
//! (is downstream of) each of its parents. Insertion is idempotent and
//! nothing is ever removed; a session's graph only grows.

use mason_config::{ConfigPath, FileMap};
use std::collections::BTreeSet;

pub struct DependencyMapper {
    child_to_parents: FileMap<Vec<ConfigPath>>,
    parent_to_children: FileMap<Vec<ConfigPath>>,
    keys: BTreeSet<ConfigPath>,
}

impl DependencyMapper {
    pub fn new() -> Self {
        Self {
            child_to_parents: FileMap::new(),
            parent_to_children: FileMap::new(),
            keys: BTreeSet::new(),
        }
    }

    /// Record that `child` references (depends on) `parent`.
    pub fn add_reference(&mut self, child: &ConfigPath, parent: &ConfigPath) {
        Self::add_edge(&mut self.child_to_parents, child, parent);
        Self::add_edge(&mut self.parent_to_children, parent, child);
        self.keys.insert(child.clone());
        self.keys.insert(parent.clone());
    }

    fn add_edge(map: &mut FileMap<Vec<ConfigPath>>, from: &ConfigPath, to: &ConfigPath) {
        match map.get_mut(from) {
            Some(edges) => {
                if !edges.contains(to) {
                    edges.push(to.clone());
                }
            }
            None => {
                map.insert(from, vec![to.clone()]);
            }
        }
    }

    /// Projects `child` references, in insertion order. Empty when unknown.
    pub fn parents_of(&self, child: &ConfigPath) -> &[ConfigPath] {
        self.child_to_parents
            .get(child)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Projects that reference `parent`, in insertion order. Empty when unknown.
    pub fn children_of(&self, parent: &ConfigPath) -> &[ConfigPath] {
        self.parent_to_children
            .get(parent)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every project that appears on either side of an edge, ordered.
    pub fn keys(&self) -> impl Iterator<Item = &ConfigPath> {
        self.keys.iter()
    }
}

impl Default for DependencyMapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn project(path: &str) -> ConfigPath {
        ConfigPath::resolve(Path::new("/"), Path::new(path))
    }

    #[test]
    fn test_add_reference_records_both_directions() {
        let mut mapper = DependencyMapper::new();
        let app = project("/app/tsconfig.json");
        let core = project("/core/tsconfig.json");

        mapper.add_reference(&app, &core);
        assert_eq!(mapper.parents_of(&app), &[core.clone()]);
        assert_eq!(mapper.children_of(&core), &[app.clone()]);
        assert_eq!(mapper.keys().count(), 2);
    }

    #[test]
    fn test_add_reference_is_idempotent() {
        let mut mapper = DependencyMapper::new();
        let app = project("/app/tsconfig.json");
        let core = project("/core/tsconfig.json");

        mapper.add_reference(&app, &core);
        mapper.add_reference(&app, &core);
        assert_eq!(mapper.parents_of(&app).len(), 1);
        assert_eq!(mapper.children_of(&core).len(), 1);
    }

    #[test]
    fn test_unknown_keys_yield_empty_slices() {
        let mapper = DependencyMapper::new();
        assert!(mapper.parents_of(&project("/nowhere/tsconfig.json")).is_empty());
        assert!(mapper.children_of(&project("/nowhere/tsconfig.json")).is_empty());
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut mapper = DependencyMapper::new();
        let app = project("/app/tsconfig.json");
        let b = project("/b/tsconfig.json");
        let a = project("/a/tsconfig.json");

        mapper.add_reference(&app, &b);
        mapper.add_reference(&app, &a);
        assert_eq!(mapper.parents_of(&app), &[b, a]);
    }
}
