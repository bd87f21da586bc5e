use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The congruence `a*b = rem + x*n` has no integer solution
    #[error("no solution exists")]
    NoSolution,

    #[error("private key missing")]
    MissingPrivateKey,

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    #[error("malformed input: {0}")]
    MalformedInput(String),
}
