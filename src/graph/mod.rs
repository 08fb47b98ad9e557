//! Graph description parsing.
//!
//! Raw markup goes through [`normalize::normalize_lines`], then the
//! [`parser`] state machine builds [`TaskRecords`] and derives the reverse
//! `next_tasks` edges.

pub mod dump;
pub mod identity;
pub mod normalize;
pub mod parser;
pub mod record;

pub use identity::TaskIdentity;
pub use parser::{parse_file, parse_str, ParseOptions};
pub use record::{Parameters, TaskRecord, TaskRecords};
