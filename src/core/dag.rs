//! Linked task graph built from parsed records.
//!
//! Nodes live in a petgraph `DiGraph` that owns them for the lifetime of a
//! run; edges point from a source to the task consuming it. A node's
//! sources are its incoming edges, returned in the order the graph file
//! lists them. Next tasks are resolved separately from each record's own
//! `next_tasks` list, so a broken source link on a dependent does not hide
//! it from its upstream task.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

use super::task::TaskNode;
use crate::graph::{TaskIdentity, TaskRecords};
use crate::glog_warn;

/// Which side of a link could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Source,
    NextTask,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeKind::Source => write!(f, "source"),
            EdgeKind::NextTask => write!(f, "next task"),
        }
    }
}

/// A reference to a task that does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenEdge {
    pub task: String,
    pub missing: String,
    pub kind: EdgeKind,
}

/// The materialized graph of task nodes carrying products of type `P`.
pub struct TaskGraph<P> {
    graph: DiGraph<TaskNode<P>, ()>,
    task_index: HashMap<String, NodeIndex>,
    next_index: HashMap<NodeIndex, Vec<NodeIndex>>,
}

/// Resolve `links` to node indices, or report every key that has no node.
fn resolve(
    task_index: &HashMap<String, NodeIndex>,
    links: &[TaskIdentity],
) -> std::result::Result<Vec<NodeIndex>, Vec<String>> {
    let missing: Vec<String> = links
        .iter()
        .map(|link| link.key())
        .filter(|key| !task_index.contains_key(key))
        .collect();
    if !missing.is_empty() {
        return Err(missing);
    }
    Ok(links.iter().map(|link| task_index[&link.key()]).collect())
}

impl<P> TaskGraph<P> {
    /// Build one node per record, then link sources and next tasks.
    ///
    /// Each list is resolved on its own: a record whose source list names a
    /// missing task keeps no sources at all, and one whose next-task list
    /// names a missing task keeps no next tasks. Every such miss is returned
    /// as a [`BrokenEdge`] instead of failing the build.
    pub fn materialize(records: &TaskRecords) -> (Self, Vec<BrokenEdge>) {
        let mut graph = DiGraph::new();
        let mut task_index = HashMap::new();
        for record in records.iter() {
            let index = graph.add_node(TaskNode::from_record(record));
            task_index.insert(record.key(), index);
        }

        let mut broken = Vec::new();
        let mut next_index = HashMap::new();
        for record in records.iter() {
            let task = record.key();
            let index = task_index[&task];

            match resolve(&task_index, &record.sources) {
                Ok(sources) => {
                    for source in sources {
                        graph.add_edge(source, index, ());
                    }
                }
                Err(missing) => {
                    for key in missing {
                        glog_warn!("Task {} lost its sources: {} does not exist", task, key);
                        broken.push(BrokenEdge {
                            task: task.clone(),
                            missing: key,
                            kind: EdgeKind::Source,
                        });
                    }
                }
            }

            match resolve(&task_index, &record.next_tasks) {
                Ok(next) => {
                    next_index.insert(index, next);
                }
                Err(missing) => {
                    for key in missing {
                        glog_warn!("Task {} lost its next tasks: {} does not exist", task, key);
                        broken.push(BrokenEdge {
                            task: task.clone(),
                            missing: key,
                            kind: EdgeKind::NextTask,
                        });
                    }
                }
            }
        }

        let graph = Self {
            graph,
            task_index,
            next_index,
        };
        (graph, broken)
    }

    pub fn get_node_index(&self, key: &str) -> Option<NodeIndex> {
        self.task_index.get(key).copied()
    }

    pub fn get_task(&self, key: &str) -> Option<&TaskNode<P>> {
        self.get_node_index(key).map(|index| &self.graph[index])
    }

    pub fn node(&self, index: NodeIndex) -> &TaskNode<P> {
        &self.graph[index]
    }

    pub(crate) fn node_mut(&mut self, index: NodeIndex) -> &mut TaskNode<P> {
        &mut self.graph[index]
    }

    pub fn task_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Direct upstream nodes, in source-list order.
    pub fn sources(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(index, Direction::Incoming)
            .filter_map(|edge| {
                let (source, _) = self.graph.edge_endpoints(edge.id())?;
                Some((edge.id(), source))
            })
            .collect();
        edges.sort_by_key(|(id, _)| *id);
        edges.into_iter().map(|(_, source)| source).collect()
    }

    /// Direct downstream nodes, in the order the record lists them.
    pub fn next_tasks(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.next_index.get(&index).cloned().unwrap_or_default()
    }

    pub fn pending_count(&self) -> usize {
        self.graph
            .node_weights()
            .filter(|node| !node.is_finished())
            .count()
    }
}

impl<P> std::fmt::Debug for TaskGraph<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskGraph")
            .field("tasks", &self.task_count())
            .field("dependencies", &self.dependency_count())
            .finish()
    }
}
