use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_format(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFormat {
                element: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Io {
                context: context.into(),
                source,
            }
            .into(),
        )
    }

    /// No record terminator was found within the probe window that starts at `offset`.
    pub fn unsegmentable_record(offset: u64, window: u64) -> Error {
        Error(ErrorKind::UnsegmentableRecord { offset, window }.into())
    }

    pub fn segment_too_large(index: usize, length: u64, capacity: u64) -> Error {
        Error(
            ErrorKind::SegmentTooLarge {
                index,
                length,
                capacity,
            }
            .into(),
        )
    }

    pub fn worker(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::Worker {
                message: message.into(),
            }
            .into(),
        )
    }

    /// Returns `true` if this error was caused by the underlying storage.
    pub fn is_io(&self) -> bool {
        matches!(self.kind(), ErrorKind::Io { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid data format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("IO error for '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },

    #[error(
        "no record terminator within {window} bytes of offset {offset}: \
         a record is longer than the segment size plus the probe window"
    )]
    UnsegmentableRecord { offset: u64, window: u64 },

    #[error("segment #{index} is {length} bytes, exceeding the read buffer of {capacity} bytes")]
    SegmentTooLarge {
        index: usize,
        length: u64,
        capacity: u64,
    },

    #[error("worker failure: {message}")]
    Worker { message: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}
