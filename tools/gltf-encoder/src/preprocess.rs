//! Mesh normalization before packing: scale, recenter, synthesize normals

use glam::Vec3;
use tracing::debug;

use crate::scene::MeshInput;
use crate::utils::compute_bounds;

/// Return a copy of `mesh` with `scale` and centering applied and
/// normals guaranteed present.
///
/// Centering moves the bounding-box midpoint to the origin (not the
/// centroid) and happens after scaling. Supplied normals are kept as-is.
pub fn preprocess_mesh(mesh: &MeshInput, scale: f32, center: bool) -> MeshInput {
    let mut vertices = mesh.vertices.clone();

    if scale != 1.0 {
        for v in &mut vertices {
            *v *= scale;
        }
    }

    if center {
        center_vertices(&mut vertices);
    }

    let normals = match mesh.normals() {
        Some(normals) => normals.to_vec(),
        None => {
            debug!(
                vertices = vertices.len() / 3,
                triangles = mesh.triangle_count(),
                "synthesizing vertex normals"
            );
            generate_normals(&vertices, &mesh.indices)
        }
    };

    MeshInput {
        name: mesh.name.clone(),
        vertices,
        indices: mesh.indices.clone(),
        normals: Some(normals),
        uvs: mesh.uvs().map(<[f32]>::to_vec),
        colors: mesh.colors().map(<[f32]>::to_vec),
    }
}

fn center_vertices(vertices: &mut [f32]) {
    let Some(bounds) = compute_bounds(vertices, 3) else {
        return;
    };
    let mid = bounds.center();

    for v in vertices.chunks_exact_mut(3) {
        v[0] -= mid[0];
        v[1] -= mid[1];
        v[2] -= mid[2];
    }
}

/// Area-weighted smooth vertex normals.
///
/// Each triangle contributes its unnormalized face normal `(v2-v1) x (v3-v1)`
/// to all three corners, so larger faces weigh more. Vertices that touch no
/// triangle, or only degenerate ones, keep a zero normal. Indices must
/// already be bounds-checked.
pub fn generate_normals(vertices: &[f32], indices: &[u32]) -> Vec<f32> {
    let vertex_count = vertices.len() / 3;
    let position = |i: u32| Vec3::from_slice(&vertices[i as usize * 3..i as usize * 3 + 3]);

    let mut accumulated = vec![Vec3::ZERO; vertex_count];
    for tri in indices.chunks_exact(3) {
        let (i1, i2, i3) = (tri[0], tri[1], tri[2]);
        let v1 = position(i1);
        let edge1 = position(i2) - v1;
        let edge2 = position(i3) - v1;
        let face_normal = edge1.cross(edge2);

        for i in [i1, i2, i3] {
            accumulated[i as usize] += face_normal;
        }
    }

    let mut normals = Vec::with_capacity(vertex_count * 3);
    for n in accumulated {
        normals.extend_from_slice(&n.normalize_or_zero().to_array());
    }
    normals
}
