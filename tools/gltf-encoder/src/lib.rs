//! Triangle mesh to glTF 2.0 encoder
//!
//! Turns a [`SceneConfig`] (flat vertex/index arrays with optional normals,
//! UVs and colors) into either pretty-printed glTF JSON with an inline
//! base64 buffer, or a single binary GLB container.
//!
//! Pipeline, one pass per request and no shared state:
//! - [`SceneConfig::validate`]: shape checks before any allocation
//! - [`preprocess_mesh`]: scale, bounding-box centering, normal synthesis
//! - [`assemble`]: document graph plus one pre-sized binary blob
//! - [`glb::pack`]: header + JSON chunk + BIN chunk
//!
//! # Example
//!
//! ```no_run
//! use gltf_encoder::*;
//!
//! let scene = SceneConfig::new(vec![MeshInput {
//!     name: Some("Triangle".into()),
//!     vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.5, 1.0, 0.0],
//!     indices: vec![0, 1, 2],
//!     ..Default::default()
//! }])
//! .with_scale(2.0)
//! .with_center(true);
//!
//! let asset = encode(&scene).unwrap();
//! std::fs::write(format!("triangle.{}", asset.file_extension()), asset.as_bytes()).unwrap();
//! ```

pub mod assemble;
pub mod buffer;
pub mod document;
pub mod encode;
pub mod error;
pub mod glb;
pub mod mesh;
pub mod preprocess;
pub mod scene;
pub mod utils;

pub use assemble::{Assembled, assemble, verify_layout};
pub use buffer::{AccessorIndex, BufferBuilder};
pub use document::{BufferSource, GltfBuilder};
pub use encode::{AssetData, EncodedAsset, encode};
pub use error::{EncodeError, GlbError, ValidationError};
pub use glb::{GlbChunks, GlbHeader, parse_glb};
pub use mesh::{MeshAccessors, pack_mesh};
pub use preprocess::{generate_normals, preprocess_mesh};
pub use scene::{MeshInput, OutputFormat, SceneConfig};
pub use utils::{Bounds, compute_bounds};

// Re-export commonly used gltf-json types
pub use gltf_json as json;
