use thiserror::Error;

pub type CtResult<T> = Result<T, CtError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CtError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("{what} {id} not found")]
    NotFound { what: &'static str, id: u32 },

    #[error("Invalid operation: {what}")]
    InvalidOperation { what: String },

    #[error("Invariant violated: {what}")]
    Invariant { what: String },
}
