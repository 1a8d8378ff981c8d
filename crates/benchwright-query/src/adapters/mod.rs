//! Per-format artifact adapters.
//!
//! Every adapter opens its file read-only, parses it fully, and returns;
//! nothing is cached across calls because artifacts may be regenerated
//! between invocations.

pub mod sqlite;
pub mod table;
pub mod text;
pub mod tree;
pub mod xml;
