//! Library half of the `tk-probe` tool.
//!
//! Collects files, runs each one through a shared
//! [`Registry`](trackerkit_formats::Registry) and renders one
//! [`ProbeRecord`] per file as JSON, CSV or a plain table.

#![warn(missing_docs)]

pub mod config;
pub mod record;
pub mod report;
pub mod scan;

pub use config::load_config;
pub use record::{ProbeRecord, ProbeStatus, probe_all, probe_bytes, probe_file};
pub use report::{OutputFormat, write_report};
pub use scan::collect_files;
