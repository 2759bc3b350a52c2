//! Top-level scene encoding

use gltf_json as json;
use tracing::{debug, info};

use crate::assemble::assemble;
use crate::error::EncodeError;
use crate::glb;
use crate::preprocess::preprocess_mesh;
use crate::scene::{OutputFormat, SceneConfig};

/// Encoded output payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetData {
    Binary(Vec<u8>),
    Text(String),
}

/// Result of encoding one scene
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAsset {
    pub data: AssetData,
    pub format: OutputFormat,
}

impl EncodedAsset {
    pub fn as_bytes(&self) -> &[u8] {
        match &self.data {
            AssetData::Binary(bytes) => bytes,
            AssetData::Text(text) => text.as_bytes(),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self.data {
            AssetData::Binary(bytes) => bytes,
            AssetData::Text(text) => text.into_bytes(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn file_extension(&self) -> &'static str {
        self.format.as_str()
    }

    pub fn mime_type(&self) -> &'static str {
        match self.format {
            OutputFormat::Glb => "model/gltf-binary",
            OutputFormat::Gltf => "model/gltf+json",
        }
    }
}

/// Encode a scene into GLB bytes or glTF JSON text, per `scene.format`.
///
/// The scene is validated before anything is allocated. Each mesh is
/// scaled, optionally centered and given normals, then all meshes are
/// packed into one buffer.
pub fn encode(scene: &SceneConfig) -> Result<EncodedAsset, EncodeError> {
    scene.validate()?;
    let scale = scene.effective_scale();

    let meshes: Vec<_> = scene
        .meshes
        .iter()
        .map(|mesh| preprocess_mesh(mesh, scale, scene.center))
        .collect();
    debug!(
        meshes = meshes.len(),
        scale,
        center = scene.center,
        "preprocessed scene"
    );

    let assembled = assemble(&meshes)?;

    let data = match scene.format {
        OutputFormat::Glb => AssetData::Binary(glb::pack(&assembled.root, &assembled.blob)?),
        OutputFormat::Gltf => {
            let root = assembled.into_embedded();
            AssetData::Text(json::serialize::to_string_pretty(&root)?)
        }
    };

    let asset = EncodedAsset {
        data,
        format: scene.format,
    };
    info!(format = %asset.format, bytes = asset.len(), "encoded scene");
    Ok(asset)
}
