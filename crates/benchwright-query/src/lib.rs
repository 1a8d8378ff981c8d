//! Golden-answer computation for benchwright templates.
//!
//! After the artifacts for a test sample have been materialized, this crate
//! re-derives expected answers by evaluating `{{fname:...}}` query calls
//! against them: text and CSV indexing, SQLite queries, dot-path navigation
//! over JSON/YAML, and a slash-path XML subset, all behind one dispatcher.

pub mod adapters;
pub mod dispatch;
pub mod errors;
pub mod filter;
pub mod path;

pub use dispatch::{Function, QueryEngine, QueryOptions};
pub use errors::QueryError;
pub use filter::{FilterOp, FilterPredicate};
pub use path::{PathSegment, SegmentOp, expand, navigate, parse_path};
