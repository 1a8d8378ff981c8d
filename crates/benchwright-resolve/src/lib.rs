//! Variable resolution for benchwright templates.
//!
//! This crate turns `{{semantic...}}`, `{{number...}}`, and `{{entity...}}`
//! placeholders into concrete values drawn from a per-session seeded RNG,
//! memoizing by token identity so the values written into generated
//! artifacts are the same values the query phase later reads back.

pub mod errors;
pub mod generate;
pub mod model;
pub mod pools;
pub mod resolver;

pub use errors::ResolveError;
pub use generate::{NumberKind, NumberValue, random_number, semantic_value};
pub use model::{Resolution, ResolvedVariable};
pub use pools::PoolCatalog;
pub use resolver::{ResolverOptions, VariableResolver};
