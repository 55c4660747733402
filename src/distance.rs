use crate::error::GraphError;
use crate::graph::ProcessGraph;
use crate::prelude::*;
use std::collections::{HashMap, VecDeque};

/// Shortest paths from a root process to every process reachable from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootDistances {
    root: String,
    paths: HashMap<String, Vec<String>>,
    /// Longest path, counted in nodes (the root alone is 1)
    max_path_length: usize,
}

impl RootDistances {
    /// Breadth-first walk from `root`. When two paths of equal length reach a
    /// node, the one discovered first wins.
    pub fn analyze(graph: &ProcessGraph, root: &str) -> Result<Self, GraphError> {
        if !graph.contains_node(root) {
            return Err(GraphError::RootNotFound(root.to_string()));
        }

        let mut paths = HashMap::new();
        paths.insert(root.to_string(), vec![root.to_string()]);

        let mut queue = VecDeque::from([root]);
        while let Some(pid) = queue.pop_front() {
            for child in graph.successors(pid) {
                if paths.contains_key(child) {
                    continue;
                }

                let mut path = paths[pid].clone();
                path.push(child.to_string());
                paths.insert(child.to_string(), path);
                queue.push_back(child);
            }
        }

        let max_path_length = paths.values().map(Vec::len).max().unwrap_or(1);
        debug!(
            "{} of {} node(s) reachable from root {root:?}, longest path has {max_path_length} node(s)",
            paths.len(),
            graph.node_count()
        );

        Ok(Self {
            root: root.to_string(),
            paths,
            max_path_length,
        })
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn path(&self, pid: &str) -> Option<&[String]> {
        self.paths.get(pid).map(Vec::as_slice)
    }

    pub fn is_reachable(&self, pid: &str) -> bool {
        self.paths.contains_key(pid)
    }

    pub fn max_path_length(&self) -> usize {
        self.max_path_length
    }

    /// Relative depth of `pid` in `(0, 1]`, or `None` when it is unreachable from the root
    pub fn proportion(&self, pid: &str) -> Option<f64> {
        self.paths
            .get(pid)
            .map(|path| path.len() as f64 / self.max_path_length as f64)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
