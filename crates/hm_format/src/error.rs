use thiserror::Error;

pub type Result<T> = ::std::result::Result<T, FormatError>;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Serialization Error: {0}")]
    SerializationError(#[from] Box<bincode::ErrorKind>),
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
    /// A face references a vertex past the end of the vertex buffer
    #[error("Face {face} of submesh {submesh} references vertex {index}, but the mesh only has {vertex_count} vertices")]
    IndexOutOfBounds {
        submesh: usize,
        face: usize,
        index: u32,
        vertex_count: usize,
    },
}
