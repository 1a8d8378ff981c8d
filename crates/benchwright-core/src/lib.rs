//! Core contracts shared by the benchwright engine crates.
//!
//! This crate defines the component model used for `TARGET_FILE`
//! resolution, the template-call scanner, and the stringification policy
//! that keeps the resolution and query phases in agreement.

pub mod component;
pub mod error;
pub mod stringify;
pub mod template;

pub use component::{Component, ComponentSet};
pub use error::{Error, Result};
pub use stringify::{format_f64, stringify_json};
pub use template::{TemplateCall, scan_calls};
