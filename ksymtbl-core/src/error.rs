use thiserror::Error;

/// The error type used by this crate.
///
/// [`Error::MissingInput`] and [`Error::MalformedInput`] are the only
/// variants a caller is expected to treat as fatal; conditions like
/// dictionary exhaustion or window overflow are non-fatal and are
/// reported through `log::warn!` instead of returned.
#[derive(Error, Debug)]
pub enum Error {
    #[error("input file not found: {0}")]
    MissingInput(String),

    #[error("malformed input at {context}: {detail}")]
    MalformedInput { context: String, detail: String },

    #[error("invalid deny-list pattern {0:?}: {1}")]
    InvalidDenyPattern(String, #[source] regex::Error),

    #[error("no retained entry has class T; cannot choose an offset base")]
    NoTextSymbol,
}

pub type Result<T> = std::result::Result<T, Error>;
