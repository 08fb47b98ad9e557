pub mod config;
pub mod core;
pub mod error;
pub mod graph;
pub mod log;
pub mod patch;
pub mod service;

pub use error::{Error, Result};
pub use graph::{TaskIdentity, TaskRecord, TaskRecords};
pub use service::{DryRunService, ProductService};
