use std::fmt;

/// An error that can occur when decoding or encoding raw data
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }

    pub(crate) fn eof(offset: usize) -> Error {
        Error::new(ErrorKind::Eof { offset })
    }

    pub(crate) fn unexpected(expected: impl Into<String>, found: impl Into<String>) -> Error {
        Error::new(ErrorKind::UnexpectedDiscriminator {
            expected: expected.into(),
            found: found.into(),
        })
    }

    pub(crate) fn trailing(discriminator: impl Into<String>, remaining: usize) -> Error {
        Error::new(ErrorKind::TrailingBytes {
            discriminator: discriminator.into(),
            remaining,
        })
    }

    pub(crate) fn unsupported(type_name: impl Into<String>, path: impl Into<String>) -> Error {
        Error::new(ErrorKind::UnsupportedProperty {
            type_name: type_name.into(),
            path: path.into(),
        })
    }

    /// Return the specific type of error
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Consume the error, returning the specific type of error
    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub(crate) fn missing(name: impl Into<String>, path: impl Into<String>) -> Error {
        Error::new(ErrorKind::MissingProperty {
            name: name.into(),
            path: path.into(),
        })
    }

    /// Returns the byte offset that the error occurs (if available)
    pub fn offset(&self) -> Option<usize> {
        self.0.offset()
    }
}

/// Specific type of error
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// Unexpected end of input
    Eof { offset: usize },

    /// A wide FString did not contain valid UTF-16
    InvalidString { offset: usize },

    /// A length or count prefix was negative or exceeded the remaining input
    InvalidLength { offset: usize, len: i64 },

    /// The declared property type or discriminator did not match what a
    /// codec expects
    UnexpectedDiscriminator { expected: String, found: String },

    /// All known fields were decoded but bytes remain in the blob
    TrailingBytes {
        discriminator: String,
        remaining: usize,
    },

    /// The property walker encountered a property type it can't read
    UnsupportedProperty { type_name: String, path: String },

    /// A codec could not find the sibling property it is keyed on
    MissingProperty { name: String, path: String },
}

impl ErrorKind {
    pub fn offset(&self) -> Option<usize> {
        match *self {
            ErrorKind::Eof { offset } => Some(offset),
            ErrorKind::InvalidString { offset } => Some(offset),
            ErrorKind::InvalidLength { offset, .. } => Some(offset),
            _ => None,
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            ErrorKind::Eof { offset } => {
                write!(f, "unexpected end of data (offset: {})", offset)
            }
            ErrorKind::InvalidString { offset } => {
                write!(f, "invalid utf-16 string (offset: {})", offset)
            }
            ErrorKind::InvalidLength { offset, len } => {
                write!(f, "invalid length prefix {} (offset: {})", len, offset)
            }
            ErrorKind::UnexpectedDiscriminator {
                ref expected,
                ref found,
            } => write!(f, "expected {}, got {}", expected, found),
            ErrorKind::TrailingBytes {
                ref discriminator,
                remaining,
            } => write!(
                f,
                "end of data not reached for {}, {} bytes remaining",
                discriminator, remaining
            ),
            ErrorKind::UnsupportedProperty {
                ref type_name,
                ref path,
            } => write!(f, "unsupported property type {} at {}", type_name, path),
            ErrorKind::MissingProperty { ref name, ref path } => {
                write!(f, "missing property {} at {}", name, path)
            }
        }
    }
}
