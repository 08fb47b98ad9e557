//! Dependency-driven execution of a [`TaskGraph`].
//!
//! Running a target first runs every pending source, depth first and in
//! source-list order, then dispatches the target itself. The traversal uses
//! an explicit stack rather than recursion, so graph depth is not bounded by
//! the call stack. A finished node is never dispatched again, which makes
//! executing an already finished target a no-op.
//!
//! Any error from the service aborts the run. Nodes finished before the
//! failure stay finished.

use petgraph::graph::NodeIndex;
use std::collections::HashSet;

use super::bands::{source_bands_value, SOURCE_BANDS, TERRAIN_CORRECTION};
use super::dag::TaskGraph;
use super::task::{TaskNode, TaskRole};
use crate::service::ProductService;
use crate::{glog, glog_debug, Error, Result};

/// Tasks dispatched by one [`Executor::execute`] call, in dispatch order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    pub dispatched: Vec<String>,
}

/// Order in which the pending part of `target`'s dependency tree would be
/// dispatched. Finished nodes and everything behind them are skipped.
///
/// # Errors
/// Returns [`Error::Cycle`] when a node depends on itself through its
/// sources.
pub fn dispatch_order<P>(graph: &TaskGraph<P>, target: NodeIndex) -> Result<Vec<NodeIndex>> {
    let mut order = Vec::new();
    let mut done: HashSet<NodeIndex> = HashSet::new();
    let mut on_path: HashSet<NodeIndex> = HashSet::new();
    // (node, sources already pushed)
    let mut stack = vec![(target, false)];

    while let Some((index, expanded)) = stack.pop() {
        if done.contains(&index) || graph.node(index).is_finished() {
            continue;
        }
        if expanded {
            on_path.remove(&index);
            done.insert(index);
            order.push(index);
            continue;
        }
        if !on_path.insert(index) {
            return Err(Error::Cycle(graph.node(index).key()));
        }

        glog_debug!("Checking: {}", graph.node(index).identity());
        stack.push((index, true));
        for source in graph.sources(index).into_iter().rev() {
            if !done.contains(&source) && !graph.node(source).is_finished() {
                stack.push((source, false));
            }
        }
    }

    Ok(order)
}

pub struct Executor<'s, S: ProductService> {
    service: &'s mut S,
}

impl<'s, S: ProductService> Executor<'s, S> {
    pub fn new(service: &'s mut S) -> Self {
        Self { service }
    }

    /// Run the task with identity `key` and everything it depends on.
    pub fn execute(
        &mut self,
        graph: &mut TaskGraph<S::Product>,
        key: &str,
    ) -> Result<ExecutionSummary> {
        let index = graph
            .get_node_index(key)
            .ok_or_else(|| Error::TaskNotFound(key.to_string()))?;
        self.execute_node(graph, index)
    }

    pub fn execute_node(
        &mut self,
        graph: &mut TaskGraph<S::Product>,
        index: NodeIndex,
    ) -> Result<ExecutionSummary> {
        let mut summary = ExecutionSummary::default();
        for next in dispatch_order(graph, index)? {
            self.dispatch(graph, next)?;
            summary.dispatched.push(graph.node(next).key());
        }
        Ok(summary)
    }

    fn dispatch(&mut self, graph: &mut TaskGraph<S::Product>, index: NodeIndex) -> Result<()> {
        let sources = graph.sources(index);
        let artifact = {
            let node = graph.node(index);
            let mut bundle = node.parameters.clone();

            if node.operator == TERRAIN_CORRECTION && bundle.contains_key(SOURCE_BANDS) {
                let first = *sources
                    .first()
                    .ok_or_else(|| Error::MissingSource(node.key()))?;
                let product = source_product(graph, node, first)?;
                let bands = source_bands_value(&self.service.band_names(product));
                glog!("SourceBands: {}", bands);
                bundle.insert(SOURCE_BANDS, &bands);
            }

            match node.role() {
                TaskRole::Operator => {
                    glog!("Running: {}", node.identity());
                    let inputs = sources
                        .iter()
                        .map(|&s| source_product(graph, node, s))
                        .collect::<Result<Vec<_>>>()?;
                    Some(self.service.create_product(&node.operator, &bundle, &inputs)?)
                }
                TaskRole::Read => {
                    let file = required(node, "file")?;
                    glog!("Reading: {}", file);
                    Some(self.service.read_product(file)?)
                }
                TaskRole::Write => {
                    let first = *sources
                        .first()
                        .ok_or_else(|| Error::MissingSource(node.key()))?;
                    let product = source_product(graph, node, first)?;
                    let file = required(node, "file")?;
                    let format_name = required(node, "formatName")?;
                    glog!("Writing {} File: {}", format_name, file);
                    self.service.write_product(product, file, format_name)?;
                    None
                }
            }
        };

        graph.node_mut(index).finish(artifact);
        Ok(())
    }
}

fn required<'n, P>(node: &'n TaskNode<P>, parameter: &str) -> Result<&'n str> {
    node.parameters
        .get(parameter)
        .ok_or_else(|| Error::MissingParameter {
            task: node.key(),
            parameter: parameter.to_string(),
        })
}

fn source_product<'g, P>(
    graph: &'g TaskGraph<P>,
    node: &TaskNode<P>,
    source: NodeIndex,
) -> Result<&'g P> {
    let source = graph.node(source);
    source.artifact().ok_or_else(|| Error::MissingArtifact {
        task: node.key(),
        source_key: source.key(),
    })
}
