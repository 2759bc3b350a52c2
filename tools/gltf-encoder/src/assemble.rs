//! Assembly of preprocessed meshes into a document graph plus binary blob

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use gltf_json as json;
use tracing::debug;

use crate::buffer::{BufferBuilder, COMPONENT_SIZE, element_width};
use crate::document::{BufferSource, GltfBuilder, set_buffer_source};
use crate::error::EncodeError;
use crate::mesh::{pack_mesh, planned_byte_length};
use crate::scene::MeshInput;

/// Prefix of the inline buffer URI used for `.gltf` output
pub const DATA_URI_PREFIX: &str = "data:application/octet-stream;base64,";

/// Encode a blob as an inline buffer URI
pub fn to_data_uri(blob: &[u8]) -> String {
    let mut uri = String::with_capacity(DATA_URI_PREFIX.len() + blob.len().div_ceil(3) * 4);
    uri.push_str(DATA_URI_PREFIX);
    STANDARD.encode_string(blob, &mut uri);
    uri
}

/// Decode any base64 `data:` URI back to bytes, whatever its media type
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, EncodeError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| EncodeError::DataUri("missing data: scheme".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| EncodeError::DataUri("missing ',' separator".into()))?;
    if !header.ends_with(";base64") {
        return Err(EncodeError::DataUri(format!(
            "expected base64 encoding, got '{header}'"
        )));
    }
    STANDARD
        .decode(payload)
        .map_err(|e| EncodeError::DataUri(e.to_string()))
}

/// Document graph plus the blob its buffer describes.
///
/// Fresh from [`assemble`], the buffer carries only `byteLength` and the
/// bytes live in `blob` (the GLB state).
#[derive(Debug, Clone)]
pub struct Assembled {
    pub root: json::Root,
    pub blob: Vec<u8>,
}

impl Assembled {
    pub fn byte_length(&self) -> usize {
        self.blob.len()
    }

    /// Move the blob into the document as a base64 data URI (the `.gltf` state)
    pub fn into_embedded(mut self) -> json::Root {
        set_buffer_source(&mut self.root, BufferSource::Embedded(to_data_uri(&self.blob)));
        self.root
    }
}

/// Build the document and blob for already-preprocessed meshes.
///
/// Each mesh is written as one contiguous block (attributes, then its
/// indices). The blob is allocated once from a planning pass, and the
/// finished layout is checked with [`verify_layout`] before returning.
pub fn assemble(meshes: &[MeshInput]) -> Result<Assembled, EncodeError> {
    let planned = planned_byte_length(meshes);
    let mut buffer = BufferBuilder::with_capacity(planned);
    let mut gltf = GltfBuilder::new();

    for (i, mesh) in meshes.iter().enumerate() {
        let start = buffer.byte_offset();
        let accessors = pack_mesh(&mut buffer, i, mesh)?;
        debug!(
            mesh = i,
            offset = start,
            bytes = buffer.byte_offset() - start,
            "packed mesh"
        );

        let name = mesh
            .name
            .clone()
            .unwrap_or_else(|| format!("Mesh_{i}"));
        gltf = gltf.add_mesh_from_accessors(&name, &accessors);
    }

    let (blob, views, accessors) = buffer.finish();
    if blob.len() != planned {
        return Err(EncodeError::encoding(
            meshes.len().saturating_sub(1),
            "buffer",
            format!("wrote {} bytes, planned {}", blob.len(), planned),
        ));
    }

    let root = gltf
        .buffer_byte_length(blob.len() as u64)
        .build(views, accessors);
    verify_layout(&root, blob.len())?;

    Ok(Assembled { root, blob })
}

/// Check the layout invariants of an assembled document:
/// every view 4-byte aligned and inside the blob, views contiguous,
/// accessor bounds finite, every accessor's `count * width * 4` equal to
/// its view's length, and the buffer's `byteLength` equal to the blob.
pub fn verify_layout(root: &json::Root, blob_len: usize) -> Result<(), EncodeError> {
    let declared = root
        .buffers
        .first()
        .map(|b| b.byte_length.0 as usize)
        .ok_or_else(|| EncodeError::encoding(0, "buffer", "document has no buffer"))?;
    if declared != blob_len {
        return Err(EncodeError::encoding(
            0,
            "buffer",
            format!("byteLength {declared} does not match blob length {blob_len}"),
        ));
    }

    // Accessor -> owning mesh, for error context
    let mut owner = vec![0usize; root.accessors.len()];
    for (mesh_idx, mesh) in root.meshes.iter().enumerate() {
        for primitive in &mesh.primitives {
            let used = primitive
                .attributes
                .values()
                .chain(primitive.indices.as_ref());
            for accessor in used {
                if let Some(slot) = owner.get_mut(accessor.value()) {
                    *slot = mesh_idx;
                }
            }
        }
    }

    let mut expected_offset = 0usize;
    for (i, accessor) in root.accessors.iter().enumerate() {
        let mesh = owner[i];
        let view_idx = accessor
            .buffer_view
            .as_ref()
            .map(|v| v.value())
            .ok_or_else(|| EncodeError::encoding(mesh, "accessor", "missing bufferView"))?;
        let view = root
            .buffer_views
            .get(view_idx)
            .ok_or_else(|| EncodeError::encoding(mesh, "accessor", "bufferView out of range"))?;

        let offset = view.byte_offset.as_ref().map_or(0, |o| o.0 as usize);
        let length = view.byte_length.0 as usize;
        if offset % COMPONENT_SIZE != 0 || length % COMPONENT_SIZE != 0 {
            return Err(EncodeError::encoding(
                mesh,
                "bufferView",
                format!("view {} misaligned (offset {offset}, length {length})", view_idx),
            ));
        }
        if offset != expected_offset || offset + length > blob_len {
            return Err(EncodeError::encoding(
                mesh,
                "bufferView",
                format!("view {} at {offset} breaks contiguous layout", view_idx),
            ));
        }
        expected_offset = offset + length;

        let finite_bounds = [&accessor.min, &accessor.max].into_iter().flatten().all(|bound| {
            bound.as_array().is_some_and(|values| {
                values
                    .iter()
                    .all(|v| v.as_f64().is_some_and(f64::is_finite))
            })
        });
        if !finite_bounds {
            return Err(EncodeError::encoding(
                mesh,
                "accessor",
                format!("accessor {i}: min/max is not an array of finite numbers"),
            ));
        }

        let width = match &accessor.type_ {
            json::validation::Checked::Valid(ty) => element_width(*ty),
            json::validation::Checked::Invalid => {
                return Err(EncodeError::encoding(mesh, "accessor", "invalid element type"));
            }
        };
        let count = accessor.count.0 as usize;
        if count * width * COMPONENT_SIZE != length {
            return Err(EncodeError::encoding(
                mesh,
                "accessor",
                format!("accessor {i}: count {count} x {width} components does not fill {length} bytes"),
            ));
        }
    }

    if expected_offset != blob_len {
        return Err(EncodeError::encoding(
            root.meshes.len().saturating_sub(1),
            "buffer",
            format!("views cover {expected_offset} of {blob_len} bytes"),
        ));
    }

    Ok(())
}
