use std::{io, num};

/// Problems with a single OBJ line
#[derive(thiserror::Error, Debug)]
pub enum ParserError {
    #[error("Failed to parse float: {0}")]
    ParseFloat(#[from] num::ParseFloatError),
    #[error("Failed to parse integer: {0}")]
    ParseInt(#[from] num::ParseIntError),
    #[error("Expected {expected} components, found {found}")]
    MissingComponents { expected: usize, found: usize },
    #[error("Failed to parse face corner: \"{0}\"")]
    ParseFace(String),
    #[error("Face references vertex {index}, but only {count} vertices are defined")]
    VertexOutOfRange { index: i64, count: usize },
}

/// Error type for decoding and encoding OBJ files
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum ObjError {
    /// The stream could not be opened, read, written or flushed
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// A line could not be parsed; decoding stops at the first one
    #[error("Parse error on line {line} (\"{content}\"): {source}")]
    Parse {
        line: usize,
        content: String,
        #[source]
        source: ParserError,
    },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type ObjResult<T> = Result<T, ObjError>;
