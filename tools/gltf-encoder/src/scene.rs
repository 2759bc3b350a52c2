//! Scene input types and shape validation

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Output container requested for a scene
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON with the buffer inlined as a base64 data URI
    Gltf,
    /// Single binary container
    #[default]
    Glb,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Gltf => "gltf",
            OutputFormat::Glb => "glb",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gltf" => Ok(OutputFormat::Gltf),
            "glb" => Ok(OutputFormat::Glb),
            other => Err(format!("unknown output format '{other}' (use gltf or glb)")),
        }
    }
}

/// One triangle mesh, stored as flat component arrays
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `[x0, y0, z0, x1, y1, z1, ...]`
    #[serde(default)]
    pub vertices: Vec<f32>,
    /// Three indices per triangle
    #[serde(default)]
    pub indices: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normals: Option<Vec<f32>>,
    /// Two components per vertex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uvs: Option<Vec<f32>>,
    /// RGBA, four components per vertex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<f32>>,
}

impl MeshInput {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Normals if present and non-empty
    pub fn normals(&self) -> Option<&[f32]> {
        non_empty(&self.normals)
    }

    /// UVs if present and non-empty
    pub fn uvs(&self) -> Option<&[f32]> {
        non_empty(&self.uvs)
    }

    /// Colors if present and non-empty
    pub fn colors(&self) -> Option<&[f32]> {
        non_empty(&self.colors)
    }

    fn validate(&self, mesh: usize) -> Result<(), ValidationError> {
        if self.vertices.is_empty() {
            return Err(ValidationError::EmptyVertices { mesh });
        }
        if self.indices.is_empty() {
            return Err(ValidationError::EmptyIndices { mesh });
        }
        if self.vertices.len() % 3 != 0 {
            return Err(ValidationError::VerticesNotTriplets {
                mesh,
                len: self.vertices.len(),
            });
        }
        if self.indices.len() % 3 != 0 {
            return Err(ValidationError::IndicesNotTriangles {
                mesh,
                len: self.indices.len(),
            });
        }

        let vertex_count = self.vertex_count();
        if let Some((position, &value)) = self
            .indices
            .iter()
            .enumerate()
            .find(|(_, i)| **i as usize >= vertex_count)
        {
            return Err(ValidationError::IndexOutOfRange {
                mesh,
                position,
                value,
                vertex_count,
            });
        }

        check_length(mesh, "normals", self.normals(), vertex_count * 3)?;
        check_length(mesh, "uvs", self.uvs(), vertex_count * 2)?;
        check_length(mesh, "colors", self.colors(), vertex_count * 4)?;

        check_finite(mesh, "vertices", Some(&self.vertices))?;
        check_finite(mesh, "normals", self.normals())?;
        check_finite(mesh, "uvs", self.uvs())?;
        check_finite(mesh, "colors", self.colors())?;
        Ok(())
    }
}

fn non_empty(values: &Option<Vec<f32>>) -> Option<&[f32]> {
    values.as_deref().filter(|v| !v.is_empty())
}

fn check_finite(
    mesh: usize,
    attribute: &'static str,
    values: Option<&[f32]>,
) -> Result<(), ValidationError> {
    match values.and_then(first_non_finite) {
        Some(position) => Err(ValidationError::NonFiniteValue {
            mesh,
            attribute,
            position,
        }),
        None => Ok(()),
    }
}

/// Position of the first NaN or infinite value
pub(crate) fn first_non_finite(values: &[f32]) -> Option<usize> {
    values.iter().position(|v| !v.is_finite())
}

fn check_length(
    mesh: usize,
    attribute: &'static str,
    values: Option<&[f32]>,
    expected: usize,
) -> Result<(), ValidationError> {
    match values {
        Some(values) if values.len() != expected => Err(ValidationError::AttributeLength {
            mesh,
            attribute,
            expected,
            actual: values.len(),
        }),
        _ => Ok(()),
    }
}

fn default_scale() -> f32 {
    1.0
}

/// A full encoding request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub meshes: Vec<MeshInput>,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub center: bool,
    #[serde(default)]
    pub format: OutputFormat,
}

impl SceneConfig {
    /// Scene with default scale, no centering and GLB output
    pub fn new(meshes: Vec<MeshInput>) -> Self {
        Self {
            meshes,
            scale: default_scale(),
            center: false,
            format: OutputFormat::default(),
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_center(mut self, center: bool) -> Self {
        self.center = center;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Scale actually applied to vertices. Zero means "unset" and falls
    /// back to the default of 1.0.
    pub fn effective_scale(&self) -> f32 {
        if self.scale == 0.0 {
            default_scale()
        } else {
            self.scale
        }
    }

    /// Check every shape rule. Stops at the first violation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.meshes.is_empty() {
            return Err(ValidationError::EmptyScene);
        }
        if !self.scale.is_finite() {
            return Err(ValidationError::InvalidScale(self.scale));
        }
        for (i, mesh) in self.meshes.iter().enumerate() {
            mesh.validate(i)?;
        }
        Ok(())
    }
}
