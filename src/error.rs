/// All possible mailfile errors.
///
/// An unreadable inline image is *not* an error: composition skips it and
/// reports the skip on the result (see `compose::Composed`).
#[derive(Debug)]
pub enum Error {
    /// Sender or recipient did not parse as a mailbox
    Address(String),
    /// Message assembly failed
    Compose(String),
    /// File write or read failed; no partial file is left at the destination
    Io(std::io::Error),
    /// The mail transfer command exited non-zero; the message file is left
    /// on disk for inspection
    Dispatch(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::Address(ref msg) => write!(f, "invalid address: {}", msg),
            Error::Compose(ref msg) => write!(f, "compose failed: {}", msg),
            Error::Io(ref err) => write!(f, "I/O error: {}", err),
            Error::Dispatch(ref msg) => write!(f, "delivery failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<lettre::error::Error> for Error {
    fn from(err: lettre::error::Error) -> Self {
        Error::Compose(err.to_string())
    }
}
