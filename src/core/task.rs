//! Stateful task nodes of a materialized graph.

use crate::graph::{Parameters, TaskIdentity, TaskRecord};

/// Execution state of a node. The only transition is `Pending` to
/// `Finished`, made once by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeStatus {
    #[default]
    Pending,
    Finished,
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeStatus::Pending => write!(f, "pending"),
            NodeStatus::Finished => write!(f, "finished"),
        }
    }
}

/// How the executor dispatches a node, decided by its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRole {
    /// Reads a product from the `file` parameter.
    Read,
    /// Writes its first source to `file` in `formatName`.
    Write,
    /// Runs `operator` on its sources.
    Operator,
}

/// A task in the linked graph, holding the product `P` once executed.
#[derive(Debug, Clone)]
pub struct TaskNode<P> {
    pub name: String,
    pub nr: String,
    pub operator: String,
    pub parameters: Parameters,
    status: NodeStatus,
    artifact: Option<P>,
}

impl<P> TaskNode<P> {
    pub fn from_record(record: &TaskRecord) -> Self {
        Self {
            name: record.name.clone(),
            nr: record.nr.clone(),
            operator: record.operator.clone(),
            parameters: record.parameters.clone(),
            status: NodeStatus::Pending,
            artifact: None,
        }
    }

    pub fn key(&self) -> String {
        format!("{}{}", self.name, self.nr)
    }

    pub fn identity(&self) -> TaskIdentity {
        TaskIdentity::new(&self.name, &self.nr)
    }

    pub fn role(&self) -> TaskRole {
        match self.name.as_str() {
            "Read" => TaskRole::Read,
            "Write" => TaskRole::Write,
            _ => TaskRole::Operator,
        }
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status == NodeStatus::Finished
    }

    pub fn artifact(&self) -> Option<&P> {
        self.artifact.as_ref()
    }

    /// Record the product and mark the node finished.
    pub(crate) fn finish(&mut self, artifact: Option<P>) {
        debug_assert!(!self.is_finished(), "task {} finished twice", self.key());
        self.artifact = artifact;
        self.status = NodeStatus::Finished;
    }
}
