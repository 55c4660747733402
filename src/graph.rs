use crate::prelude::*;
use crate::reconcile::UnifiedRecord;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// A process, keyed by its PID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessNode {
    pub pid: String,
    /// Command of the last record that declared this PID, `None` when only seen as a parent
    pub label: Option<String>,
}

/// Directed parent -> child process graph.
///
/// Built in a single pass by [`GraphBuilder`] and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ProcessGraph {
    graph: DiGraph<ProcessNode, ()>,
    index_by_pid: HashMap<String, NodeIndex>,
}

impl ProcessGraph {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a UnifiedRecord>,
    {
        let mut builder = GraphBuilder::new();
        for record in records {
            builder.add_record(record);
        }
        builder.into_graph()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains_node(&self, pid: &str) -> bool {
        self.index_by_pid.contains_key(pid)
    }

    pub fn node(&self, pid: &str) -> Option<&ProcessNode> {
        self.index_by_pid.get(pid).map(|&index| &self.graph[index])
    }

    pub fn label(&self, pid: &str) -> Option<&str> {
        self.node(pid).and_then(|node| node.label.as_deref())
    }

    pub fn has_edge(&self, parent: &str, child: &str) -> bool {
        match (self.index_by_pid.get(parent), self.index_by_pid.get(child)) {
            (Some(&parent), Some(&child)) => self.graph.contains_edge(parent, child),
            _ => false,
        }
    }

    /// Nodes in the order they were first seen
    pub fn nodes(&self) -> impl Iterator<Item = &ProcessNode> {
        self.graph.node_weights()
    }

    /// `(parent, child)` pairs in the order they were first added
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.graph.raw_edges().iter().map(|edge| {
            (
                self.graph[edge.source()].pid.as_str(),
                self.graph[edge.target()].pid.as_str(),
            )
        })
    }

    /// Children of `pid` in the order their edges were added
    pub fn successors(&self, pid: &str) -> Vec<&str> {
        let Some(&index) = self.index_by_pid.get(pid) else {
            return Vec::new();
        };

        // petgraph walks a node's edge list newest first
        let mut children = self
            .graph
            .neighbors_directed(index, Direction::Outgoing)
            .map(|child| self.graph[child].pid.as_str())
            .collect::<Vec<_>>();
        children.reverse();
        children
    }
}

/// Accumulates reconciled records into a [`ProcessGraph`]
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: ProcessGraph,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `record.pid` as a child of `record.ppid`.
    ///
    /// The label of a PID that is declared more than once is the last command seen.
    pub fn add_record(&mut self, record: &UnifiedRecord) {
        let child = self.upsert_node(&record.pid);
        self.graph.graph[child].label = Some(record.command.clone());

        let parent = self.upsert_node(&record.ppid);
        if self.graph.graph.find_edge(parent, child).is_none() {
            self.graph.graph.add_edge(parent, child, ());
        } else {
            trace!("Edge {} -> {} already present", record.ppid, record.pid);
        }
    }

    fn upsert_node(&mut self, pid: &str) -> NodeIndex {
        if let Some(&index) = self.graph.index_by_pid.get(pid) {
            return index;
        }

        let index = self.graph.graph.add_node(ProcessNode {
            pid: pid.to_string(),
            label: None,
        });
        self.graph.index_by_pid.insert(pid.to_string(), index);
        index
    }

    pub fn into_graph(self) -> ProcessGraph {
        debug!(
            "Built process graph with {} node(s) and {} edge(s)",
            self.graph.node_count(),
            self.graph.edge_count()
        );
        self.graph
    }
}
