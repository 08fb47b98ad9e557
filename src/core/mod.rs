//! Linked task graph and its executor.
//!
//! Parsed records become [`TaskNode`]s inside a [`TaskGraph`], which the
//! [`Executor`] walks to produce products through a
//! [`ProductService`](crate::service::ProductService).

pub mod bands;
pub mod dag;
pub mod executor;
pub mod task;

pub use dag::{BrokenEdge, EdgeKind, TaskGraph};
pub use executor::{dispatch_order, ExecutionSummary, Executor};
pub use task::{NodeStatus, TaskNode, TaskRole};
