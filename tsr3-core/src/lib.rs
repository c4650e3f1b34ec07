pub mod error;
pub mod indexed_array;
pub mod vector;

pub use error::{AttributeKind, ConvertError, ConvertResult};
pub use indexed_array::IndexedArray;
pub use vector::{CollisionVertex, RenderVertex, Vec2, Vec3, Vector};
