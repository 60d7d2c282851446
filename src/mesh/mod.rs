mod corner;
mod data;
mod frame;
mod loader;

pub use corner::{Corner, Face};
pub use data::MeshData;
pub use frame::{CornerFrame, PolygonCorner};
pub use loader::load_meshes;
