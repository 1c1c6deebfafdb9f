use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid note symbol: {0:?}")]
    InvalidNoteSymbol(String),
    #[error("Unknown sort algorithm: {0:?}")]
    UnknownAlgorithm(String),
    #[error("Output adapter failed: {0}")]
    Output(String),
    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
