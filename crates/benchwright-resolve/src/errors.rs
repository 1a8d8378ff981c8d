use thiserror::Error;

/// Errors emitted by the variable resolver.
///
/// Malformed token syntax never reaches this type; unrecognized tokens are
/// left in the text untouched. These errors cover invalid values inside a
/// recognized grammar.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unknown number kind '{0}'")]
    UnknownNumberKind(String),
    #[error("invalid number range: min {min} must be <= max {max}")]
    InvalidRange { min: f64, max: f64 },
    #[error("round increment must be a positive integer in '{0}'")]
    InvalidIncrement(String),
    #[error("unknown entity pool '{name}' (known pools: {known})")]
    UnknownPool { name: String, known: String },
    #[error("entity pool '{0}' is empty")]
    EmptyPool(String),
}
