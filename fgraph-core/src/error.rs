use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("input not found: {0}")]
    MissingInput(String),

    #[error("malformed input at {context}: {detail}")]
    MalformedInput { context: String, detail: String },

    #[error("event references tid {0} with no entry in the thread name map")]
    UnknownTid(u64),
}

pub type Result<T> = std::result::Result<T, Error>;
