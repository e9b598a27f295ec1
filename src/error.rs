use std::error::Error;
use std::fmt;
use std::io;

use crate::encoding::Encoding;

/// An error that occurs while reading a CSV data file into dict rows.
#[derive(Debug)]
pub enum ReaderError {
    /// An I/O error
    Io(io::Error),
    /// A CSV parsing error on a data row (from the csv crate)
    Csv(csv::Error),
    /// A CSV parsing error while reading the header row
    InvalidHeader(csv::Error),
    /// None of the candidate encodings could decode the input
    EncodingNotDetected(Vec<Encoding>),
    /// An encoding label that doesn't name a known encoding
    UnknownEncoding(String),
}

pub type Result<T> = ::std::result::Result<T, ReaderError>;

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ReaderError::Io(ref err) => write!(f, "IO error: {}", err),
            ReaderError::Csv(ref err) => write!(f, "CSV read error: {}", err),
            ReaderError::InvalidHeader(ref err) => {
                write!(f, "{}: invalid keys/column names", err)
            }
            ReaderError::EncodingNotDetected(ref tried) => {
                let names: Vec<&str> = tried.iter().map(Encoding::name).collect();
                write!(f, "Encoding detection failed (tried: {})", names.join(", "))
            }
            ReaderError::UnknownEncoding(ref label) => write!(f, "Unknown encoding: {}", label),
        }
    }
}

impl Error for ReaderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            ReaderError::Io(ref err) => Some(err),
            ReaderError::Csv(ref err) | ReaderError::InvalidHeader(ref err) => Some(err),
            ReaderError::EncodingNotDetected(_) | ReaderError::UnknownEncoding(_) => None,
        }
    }
}

impl From<io::Error> for ReaderError {
    fn from(err: io::Error) -> ReaderError {
        ReaderError::Io(err)
    }
}
impl From<csv::Error> for ReaderError {
    fn from(err: csv::Error) -> ReaderError {
        ReaderError::Csv(err)
    }
}
