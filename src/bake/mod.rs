mod aggregate;
mod config;
mod encode;
mod error;
mod normalize;
mod pipeline;

pub use aggregate::{aggregate, VertexNormal, MIN_FACE_COSINE};
pub use config::{BakeConfig, Strategy};
pub use encode::{encode, tangent_space_direction, CornerColor, EncodedColors};
pub use error::BakeError;
pub use normalize::{clamp_lengths, force_unit, max_length, normalize_lengths, rescale_to_max};
pub use pipeline::{bake, BakeResult};
