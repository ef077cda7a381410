//! Results storage module
//!
//! Keeps finished suite runs on disk for later listing and export.

mod storage;

pub use storage::{ResultsStorage, RunInfo, StoredRun};
