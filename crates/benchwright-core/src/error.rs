use thiserror::Error;

/// Core error type shared across benchwright crates.
#[derive(Debug, Error)]
pub enum Error {
    /// `TARGET_FILE` was used but no components were supplied.
    #[error("TARGET_FILE used but no components are available")]
    NoComponents,
    /// `TARGET_FILE[name]` referenced a component that does not exist.
    #[error("unknown component '{name}' (known components: {known})")]
    UnknownComponent { name: String, known: String },
}

/// Convenience alias for results returned by benchwright crates.
pub type Result<T> = std::result::Result<T, Error>;
