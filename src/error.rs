//! Error types for `incident-report`.
//!
//! Recoverable conditions (a missing font, an invalid text style, content that does not fit the
//! page) are handled inside the crate by degrading to a fallback.  Only conditions that prevent a
//! document from being produced or stored are reported as an [`Error`][].
//!
//! [`Error`]: struct.Error.html

use std::error;
use std::fmt;
use std::io;

/// Helper trait for creating [`Error`][] instances.
///
/// This trait is inspired by [`anyhow::Context`][].
///
/// [`Error`]: struct.Error.html
/// [`anyhow::Context`]: https://docs.rs/anyhow/latest/anyhow/trait.Context.html
pub trait Context<T> {
    /// Maps the error to an [`Error`][] instance with the given message.
    ///
    /// [`Error`]: struct.Error.html
    fn context(self, msg: impl Into<String>) -> Result<T, Error>;

    /// Maps the error to an [`Error`][] instance message produced by the given callback.
    ///
    /// [`Error`]: struct.Error.html
    fn with_context<F, S>(self, f: F) -> Result<T, Error>
    where
        F: Fn() -> S,
        S: Into<String>;
}

impl<T, E: Into<ErrorKind>> Context<T> for Result<T, E> {
    fn context(self, msg: impl Into<String>) -> Result<T, Error> {
        self.map_err(|err| Error::new(msg, err))
    }

    fn with_context<F, S>(self, f: F) -> Result<T, Error>
    where
        F: Fn() -> S,
        S: Into<String>,
    {
        self.map_err(|err| Error::new(f(), err))
    }
}

/// An error that occured while resolving fonts, laying out or rendering a report.
#[derive(Debug)]
pub struct Error {
    msg: String,
    kind: ErrorKind,
}

impl Error {
    /// Creates a new error.
    pub fn new(msg: impl Into<String>, kind: impl Into<ErrorKind>) -> Error {
        Error {
            msg: msg.into(),
            kind: kind.into(),
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            ErrorKind::IoError(err) => Some(err),
            ErrorKind::PdfError(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::IoError(err) => write!(f, "{}: {}", &self.msg, err),
            ErrorKind::PdfError(err) => write!(f, "{}: {}", &self.msg, err),
            ErrorKind::RusttypeError(err) => write!(f, "{}: {}", &self.msg, err),
            _ => f.write_str(&self.msg),
        }
    }
}

/// The kind of an [`Error`](struct.Error.html).
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An internal error, for example the layout stages were run out of order.
    Internal,
    /// The caller provided invalid data, for example a drafting response without section tags.
    InvalidData,
    /// A font file could not be parsed, embedded or subsetted.
    InvalidFont,
    /// The table content does not fit on the page even after compression and the layout is
    /// configured to reject clipping.
    PageSizeExceeded,
    /// An IO error.
    IoError(io::Error),
    /// An error raised while assembling or serializing the PDF document.
    PdfError(lopdf::Error),
    /// An error caused by `rusttype` while reading font data.
    RusttypeError(rusttype::Error),
}

impl From<io::Error> for ErrorKind {
    fn from(error: io::Error) -> ErrorKind {
        ErrorKind::IoError(error)
    }
}

impl From<lopdf::Error> for ErrorKind {
    fn from(error: lopdf::Error) -> ErrorKind {
        ErrorKind::PdfError(error)
    }
}

impl From<rusttype::Error> for ErrorKind {
    fn from(error: rusttype::Error) -> ErrorKind {
        ErrorKind::RusttypeError(error)
    }
}
