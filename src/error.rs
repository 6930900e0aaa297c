use thiserror::Error;

/// Errors produced by the request and response contexts and by
/// application setup.
#[derive(Debug, Error)]
pub enum Error {
    /// A header, path capture or form field is absent.
    #[error("no such key '{0}' in request data")]
    NotFound(String),

    /// An integer key past the end of the unnamed path captures.
    #[error("no such index '{0}' in request data")]
    OutOfRange(isize),

    /// An integer key used on captures that are not a sequence.
    #[error("path values are a string; index meaningless")]
    TypeMismatch,

    #[error("failed to read body: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed form data: {0}")]
    Form(String),

    #[error("body size exceeded limit of {0} bytes")]
    BodyTooLarge(usize),

    #[error("invalid path pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("invalid route template: {0}")]
    Route(#[from] matchit::InsertError),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// One or more cleanup actions failed while finalizing a response.
    #[error("{0} cleanup action(s) failed")]
    Cleanup(usize),
}
