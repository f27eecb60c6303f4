//! Dependency graph construction and the layered build queue
//!
//! A depth-first walk from the roots records reference edges and appends
//! each project to the layer matching its recursion depth: roots in layer 0,
//! their references one layer deeper, and so on. A project reached along
//! several paths is kept only in its deepest layer, so popping from the tail
//! of the last non-empty layer always yields a project whose upstreams have
//! all been handed out already (reverse-topological, deepest leaves first).
//!
//! Input graphs are assumed acyclic.

use crate::cache::ConfigCache;
use crate::depmap::DependencyMapper;
use crate::diagnostics::{Diagnostic, Reporter};
use crate::host::BuildHost;
use mason_config::{ConfigPath, ProjectConfig};
use std::collections::HashSet;

pub struct DependencyGraph {
    pub build_queue: BuildQueue,
    pub dependency_map: DependencyMapper,
}

/// Layered project queue; consuming from the tail gives build order.
pub struct BuildQueue {
    layers: Vec<Vec<ConfigPath>>,
}

impl BuildQueue {
    /// Pop the next project to attempt, dropping exhausted trailing layers.
    pub fn next(&mut self) -> Option<ConfigPath> {
        while let Some(layer) = self.layers.last_mut() {
            if let Some(project) = layer.pop() {
                return Some(project);
            }
            self.layers.pop();
        }
        None
    }

    pub fn layers(&self) -> &[Vec<ConfigPath>] {
        &self.layers
    }

    /// Remaining projects in the order they will be attempted.
    pub fn attempt_order(&self) -> impl Iterator<Item = &ConfigPath> {
        self.layers.iter().rev().flat_map(|layer| layer.iter().rev())
    }

    pub fn len(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(Vec::is_empty)
    }
}

/// Walk the references of `roots` and build the layered queue plus the
/// bidirectional dependency map. A root whose manifest cannot be loaded gets
/// a diagnostic and is skipped.
pub fn create_dependency_graph(
    host: &dyn BuildHost,
    cache: &mut ConfigCache,
    reporter: &dyn Reporter,
    roots: &[ConfigPath],
) -> DependencyGraph {
    let mut builder = GraphBuilder {
        host,
        cache,
        reporter,
        layers: Vec::new(),
        depth: 0,
        dependency_map: DependencyMapper::new(),
    };

    for root in roots {
        match builder.cache.parse(builder.host, builder.reporter, root) {
            Some(config) => builder.enumerate(root, &config),
            None => builder.reporter.report(&Diagnostic::error(format!(
                "Could not load project '{root}'"
            ))),
        }
    }

    builder.finish()
}

struct GraphBuilder<'a> {
    host: &'a dyn BuildHost,
    cache: &'a mut ConfigCache,
    reporter: &'a dyn Reporter,
    layers: Vec<Vec<ConfigPath>>,
    depth: usize,
    dependency_map: DependencyMapper,
}

impl GraphBuilder<'_> {
    fn enumerate(&mut self, path: &ConfigPath, config: &ProjectConfig) {
        while self.layers.len() <= self.depth {
            self.layers.push(Vec::new());
        }
        let layer = &mut self.layers[self.depth];
        if !layer.contains(path) {
            layer.push(path.clone());
        }

        for reference in &config.project_references {
            self.dependency_map.add_reference(path, reference);
            if let Some(ref_config) = self.cache.parse(self.host, self.reporter, reference) {
                self.depth += 1;
                self.enumerate(reference, &ref_config);
                self.depth -= 1;
            }
        }
    }

    /// De-duplicate across layers, keeping only the deepest occurrence of
    /// each project, then hand the layers over as a queue.
    fn finish(mut self) -> DependencyGraph {
        let layer_count = self.layers.len();
        for i in 0..layer_count.saturating_sub(1) {
            let (head, tail) = self.layers.split_at_mut(i + 1);
            let deeper: HashSet<&ConfigPath> = tail.iter().flatten().collect();
            head[i].retain(|project| !deeper.contains(project));
        }
        DependencyGraph {
            build_queue: BuildQueue {
                layers: self.layers,
            },
            dependency_map: self.dependency_map,
        }
    }
}
