pub mod assets;
pub mod scene;

pub mod prelude {
    pub use crate::assets::obj::{
        decode, encode, save, FaceOutcome, MeshSource, ObjDecoder, ObjEncoder, ObjError,
        ParserError, SplitMode,
    };
    pub use crate::scene::{Entity, Material, MaterialLookup, MeshRenderer, Transform};
    pub use gfx_maths::*;
    pub use hm_format::mesh::{Face, MeshData, Submesh, Vertex};
}
