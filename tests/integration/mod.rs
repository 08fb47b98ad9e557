//! Integration test suite for snapgraph.
//!
//! These tests drive whole graph files through parsing, patching,
//! materialization and execution. They verify that all components work
//! together correctly.
//!
//! # Test Categories
//!
//! - `parsing`: Graph files to task records
//! - `patching`: Launcher-style override lists
//! - `execution`: Dependency-driven runs against a recording service
//!
//! The processing backend is replaced by `fixtures::RecordingService`, so no
//! image data is read or written.

mod fixtures;

mod parsing;
