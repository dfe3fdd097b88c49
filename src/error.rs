use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid amount `{input}`: {reason}")]
    Parse { input: String, reason: &'static str },
    #[error("{0} is unavailable")]
    ReadUnavailable(String),
    #[error("Connect wallet first.")]
    NotConnected,
    #[error("Please switch to {expected}.")]
    WrongNetwork {
        expected: String,
        actual: Option<u64>,
    },
    #[error("{0}")]
    WriteRejected(String),
    #[error("arithmetic degenerate: {0}")]
    ArithmeticDegenerate(&'static str),
    #[error("{0} timed out after {1}s")]
    Timeout(&'static str, u64),
    #[error("A purchase is already in progress.")]
    AttemptInFlight,
    #[error("Enter an amount greater than zero.")]
    EmptyAmount,
    #[error("invalid purchase transition: {0}")]
    InvalidTransition(String),
}
