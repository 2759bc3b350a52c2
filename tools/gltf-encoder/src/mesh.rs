//! Per-mesh packing into the shared buffer

use crate::buffer::{AccessorIndex, BufferBuilder, COMPONENT_SIZE};
use crate::error::EncodeError;
use crate::scene::{MeshInput, first_non_finite};
use crate::utils::compute_bounds;

/// Accessor indices for a mesh
#[derive(Debug, Clone)]
pub struct MeshAccessors {
    pub positions: AccessorIndex,
    pub normals: Option<AccessorIndex>,
    pub uvs: Option<AccessorIndex>,
    pub colors: Option<AccessorIndex>,
    pub indices: AccessorIndex,
}

/// Bytes a mesh occupies in the blob: every attribute plus its indices
pub fn mesh_byte_length(mesh: &MeshInput) -> usize {
    let components = mesh.vertices.len()
        + mesh.normals().map_or(0, <[f32]>::len)
        + mesh.uvs().map_or(0, <[f32]>::len)
        + mesh.colors().map_or(0, <[f32]>::len)
        + mesh.indices.len();
    components * COMPONENT_SIZE
}

/// Total blob size for a set of meshes, used to allocate the buffer once
pub fn planned_byte_length(meshes: &[MeshInput]) -> usize {
    meshes.iter().map(mesh_byte_length).sum()
}

/// Append one mesh as a contiguous block:
/// POSITION, NORMAL, TEXCOORD_0, COLOR_0 (when present), then indices.
pub fn pack_mesh(
    buffer: &mut BufferBuilder,
    mesh_idx: usize,
    mesh: &MeshInput,
) -> Result<MeshAccessors, EncodeError> {
    let bounds = compute_bounds(&mesh.vertices, 3)
        .ok_or_else(|| EncodeError::encoding(mesh_idx, "POSITION", "no vertex data"))?;

    // Scaling can overflow finite input, so check what is actually written
    let mut attribute = |stage: &'static str, values: &[f32], stride: usize, with_bounds| {
        if let Some(position) = first_non_finite(values) {
            return Err(EncodeError::encoding(
                mesh_idx,
                stage,
                format!("component {position} is not finite ({})", values[position]),
            ));
        }
        buffer
            .pack_attribute(values, stride, if with_bounds { Some(&bounds) } else { None })
            .ok_or_else(|| {
                EncodeError::encoding(mesh_idx, stage, format!("unsupported stride {stride}"))
            })
    };

    let positions = attribute("POSITION", &mesh.vertices, 3, true)?;
    let normals = mesh
        .normals()
        .map(|n| attribute("NORMAL", n, 3, false))
        .transpose()?;
    let uvs = mesh
        .uvs()
        .map(|uv| attribute("TEXCOORD_0", uv, 2, false))
        .transpose()?;
    let colors = mesh
        .colors()
        .map(|c| attribute("COLOR_0", c, 4, false))
        .transpose()?;
    let indices = buffer.pack_indices(&mesh.indices);

    Ok(MeshAccessors {
        positions,
        normals,
        uvs,
        colors,
        indices,
    })
}
