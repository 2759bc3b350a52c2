//! mesh-export library
//!
//! Scene loading (JSON/YAML), the meshes.toml batch manifest, size limits
//! and GLB inspection around the `gltf-encoder` core.

pub mod build;
pub mod input;
pub mod inspect;
pub mod manifest;

pub use build::{BuiltAsset, build_all, check_all, convert_file, convert_to_memory};
pub use input::{SceneOptions, load_scene, scene_from_json, scene_from_yaml};
pub use inspect::{GlbSummary, inspect_file, summarize};
pub use manifest::{Limits, MANIFEST_FILE, Manifest, SceneEntry};
