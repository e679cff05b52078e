//! Bounded discovery of shortest paths between candidate nodes

use crate::graph::{GraphPath, GraphStore};

/// Default number of paths collected per query
pub const DEFAULT_MAX_PATHS: usize = 5;

/// Collects at most `max_paths` shortest paths between candidate pairs
#[derive(Debug, Clone, Copy)]
pub struct PathFinder {
    max_paths: usize,
}

impl Default for PathFinder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PATHS)
    }
}

impl PathFinder {
    pub fn new(max_paths: usize) -> Self {
        Self { max_paths }
    }

    pub fn max_paths(&self) -> usize {
        self.max_paths
    }

    /// Walk (source, target) pairs in list order and keep one shortest path
    /// per connected pair, stopping once the budget is reached
    ///
    /// The result depends on the order of `sources` and `targets`.
    pub fn find_paths(&self, store: &GraphStore, sources: &[String], targets: &[String]) -> Vec<GraphPath> {
        let mut paths = Vec::new();
        if self.max_paths == 0 {
            return paths;
        }

        for source in sources {
            for target in targets {
                if source == target || !store.has_path(source, target) {
                    continue;
                }
                if let Some(path) = store.shortest_path(source, target) {
                    log::debug!("Path {} -> {}: {}", source, target, path);
                    paths.push(path);
                    if paths.len() >= self.max_paths {
                        return paths;
                    }
                }
            }
        }

        paths
    }
}
