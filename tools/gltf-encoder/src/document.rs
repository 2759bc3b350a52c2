//! GLTF document construction

use crate::MeshAccessors;
use gltf_json as json;
use gltf_json::validation::Checked::Valid;
use std::collections::BTreeMap;

/// Generator string written into `asset.generator`
pub const GENERATOR: &str = concat!("gltf-encoder ", env!("CARGO_PKG_VERSION"));

/// Name of the single material every primitive references
pub const DEFAULT_MATERIAL_NAME: &str = "Default";

/// The one material shared by all primitives: opaque white, non-metallic,
/// fully rough, single-sided.
pub fn default_material() -> json::Material {
    json::Material {
        name: Some(DEFAULT_MATERIAL_NAME.to_string()),
        pbr_metallic_roughness: json::material::PbrMetallicRoughness {
            base_color_factor: json::material::PbrBaseColorFactor([1.0, 1.0, 1.0, 1.0]),
            metallic_factor: json::material::StrengthFactor(0.0),
            roughness_factor: json::material::StrengthFactor(1.0),
            ..Default::default()
        },
        alpha_mode: Valid(json::material::AlphaMode::Opaque),
        double_sided: false,
        ..Default::default()
    }
}

/// Where the buffer's bytes live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferSource {
    /// Payload carried out-of-band (GLB BIN chunk); only `byteLength` is written
    External,
    /// Payload inlined as a `data:` URI
    Embedded(String),
}

/// Builder for complete GLTF documents: one node and one single-primitive
/// mesh per input mesh, all under scene 0.
pub struct GltfBuilder {
    nodes: Vec<json::Node>,
    meshes: Vec<json::Mesh>,
    buffer_byte_length: u64,
    buffer_source: BufferSource,
}

impl GltfBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            meshes: Vec::new(),
            buffer_byte_length: 0,
            buffer_source: BufferSource::External,
        }
    }

    /// Set buffer byte length (required before building)
    pub fn buffer_byte_length(mut self, length: u64) -> Self {
        self.buffer_byte_length = length;
        self
    }

    pub fn buffer_source(mut self, source: BufferSource) -> Self {
        self.buffer_source = source;
        self
    }

    /// Get the current node count
    pub fn node_count(&self) -> u32 {
        self.nodes.len() as u32
    }

    /// Add a mesh and the node instancing it. Node `i` always references mesh `i`.
    pub fn add_mesh_from_accessors(mut self, name: &str, accessors: &MeshAccessors) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(
            Valid(json::mesh::Semantic::Positions),
            accessors.positions.as_json_index(),
        );

        if let Some(normals) = accessors.normals {
            attributes.insert(
                Valid(json::mesh::Semantic::Normals),
                normals.as_json_index(),
            );
        }

        if let Some(uvs) = accessors.uvs {
            attributes.insert(
                Valid(json::mesh::Semantic::TexCoords(0)),
                uvs.as_json_index(),
            );
        }

        if let Some(colors) = accessors.colors {
            attributes.insert(
                Valid(json::mesh::Semantic::Colors(0)),
                colors.as_json_index(),
            );
        }

        let primitive = json::mesh::Primitive {
            attributes,
            extensions: Default::default(),
            extras: Default::default(),
            indices: Some(accessors.indices.as_json_index()),
            material: Some(json::Index::new(0)),
            mode: Valid(json::mesh::Mode::Triangles),
            targets: None,
        };

        let mesh_index = json::Index::new(self.meshes.len() as u32);
        self.meshes.push(json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.to_string()),
            primitives: vec![primitive],
            weights: None,
        });

        self.nodes.push(json::Node {
            camera: None,
            children: None,
            extensions: Default::default(),
            extras: Default::default(),
            matrix: None,
            mesh: Some(mesh_index),
            name: Some(name.to_string()),
            rotation: None,
            scale: None,
            skin: None,
            translation: None,
            weights: None,
        });

        self
    }

    /// Build final GLTF Root (requires buffer views and accessors from BufferBuilder)
    pub fn build(
        self,
        buffer_views: Vec<json::buffer::View>,
        accessors: Vec<json::Accessor>,
    ) -> json::Root {
        let uri = match self.buffer_source {
            BufferSource::External => None,
            BufferSource::Embedded(uri) => Some(uri),
        };
        let buffers = vec![json::Buffer {
            byte_length: self.buffer_byte_length.into(),
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            uri,
        }];

        let scene = json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            nodes: (0..self.nodes.len() as u32).map(json::Index::new).collect(),
        };

        json::Root {
            accessors,
            animations: Vec::new(),
            asset: json::Asset {
                copyright: None,
                extensions: Default::default(),
                extras: Default::default(),
                generator: Some(GENERATOR.to_string()),
                min_version: None,
                version: "2.0".to_string(),
            },
            buffers,
            buffer_views,
            cameras: Vec::new(),
            extensions: Default::default(),
            extensions_required: Vec::new(),
            extensions_used: Vec::new(),
            extras: Default::default(),
            images: Vec::new(),
            materials: vec![default_material()],
            meshes: self.meshes,
            nodes: self.nodes,
            samplers: Vec::new(),
            scene: Some(json::Index::new(0)),
            scenes: vec![scene],
            skins: Vec::new(),
            textures: Vec::new(),
        }
    }
}

impl Default for GltfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Point the document's single buffer at `source`
pub fn set_buffer_source(root: &mut json::Root, source: BufferSource) {
    if let Some(buffer) = root.buffers.first_mut() {
        buffer.uri = match source {
            BufferSource::External => None,
            BufferSource::Embedded(uri) => Some(uri),
        };
    }
}
