//! GLB container packing and reading (glTF 2.0 binary layout)
//!
//! Layout, all integers little-endian u32:
//!
//! ```text
//! magic "glTF" | version 2 | total length
//! JSON chunk length | "JSON" | compact JSON, space padded to 4
//! BIN chunk length  | "BIN\0" | payload, zero padded to 4
//! ```

use gltf_json as json;
use tracing::debug;

use crate::assemble::decode_data_uri;
use crate::document::{BufferSource, set_buffer_source};
use crate::error::{EncodeError, GlbError};
use crate::utils::{pad_to_4, padding_to_4};

/// "glTF"
pub const GLB_MAGIC: u32 = 0x4654_6C67;
pub const GLB_VERSION: u32 = 2;
/// "JSON"
pub const CHUNK_TYPE_JSON: u32 = 0x4E4F_534A;
/// "BIN\0"
pub const CHUNK_TYPE_BIN: u32 = 0x004E_4942;

pub const HEADER_SIZE: usize = 12;
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Pack a document whose buffer is an embedded base64 data URI.
///
/// The URI is decoded to the BIN payload and the buffer entry is reduced to
/// `{ byteLength }` in a copy of the document before serialization.
pub fn pack_embedded(root: &json::Root) -> Result<Vec<u8>, EncodeError> {
    let uri = root
        .buffers
        .first()
        .and_then(|b| b.uri.as_deref())
        .ok_or_else(|| EncodeError::DataUri("document buffer has no URI".into()))?;
    let binary = decode_data_uri(uri)?;

    let mut root = root.clone();
    root.buffers.truncate(1);
    set_buffer_source(&mut root, BufferSource::External);
    root.buffers[0].byte_length = binary.len().into();

    pack(&root, &binary)
}

/// Pack a document whose buffer payload is carried separately in `binary`
pub fn pack(root: &json::Root, binary: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let mut json_bytes = json::serialize::to_vec(root)?;
    pad_to_4(&mut json_bytes, b' ');

    let bin_padding = padding_to_4(binary.len());
    let bin_chunk_length = binary.len() + bin_padding;

    let total_length =
        HEADER_SIZE + CHUNK_HEADER_SIZE + json_bytes.len() + CHUNK_HEADER_SIZE + bin_chunk_length;
    let total_u32 = u32::try_from(total_length).map_err(|_| {
        EncodeError::encoding(
            root.meshes.len().saturating_sub(1),
            "glb",
            format!("container of {total_length} bytes exceeds the 4 GiB GLB limit"),
        )
    })?;

    let mut glb = Vec::with_capacity(total_length);

    // Header
    glb.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
    glb.extend_from_slice(&total_u32.to_le_bytes());

    // JSON chunk
    glb.extend_from_slice(&(json_bytes.len() as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_TYPE_JSON.to_le_bytes());
    glb.extend_from_slice(&json_bytes);

    // BIN chunk
    glb.extend_from_slice(&(bin_chunk_length as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_TYPE_BIN.to_le_bytes());
    glb.extend_from_slice(binary);
    glb.extend(std::iter::repeat_n(0u8, bin_padding));

    debug!(
        total = total_length,
        json = json_bytes.len(),
        bin = bin_chunk_length,
        "packed GLB"
    );
    Ok(glb)
}

/// The fixed 12-byte GLB header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlbHeader {
    pub magic: u32,
    pub version: u32,
    pub length: u32,
}

impl GlbHeader {
    pub fn read(bytes: &[u8]) -> Result<Self, GlbError> {
        if bytes.len() < HEADER_SIZE {
            return Err(GlbError::Truncated(bytes.len()));
        }
        Ok(Self {
            magic: read_u32(bytes, 0),
            version: read_u32(bytes, 4),
            length: read_u32(bytes, 8),
        })
    }
}

/// Borrowed views of a GLB's two chunks
#[derive(Debug, Clone, Copy)]
pub struct GlbChunks<'a> {
    pub header: GlbHeader,
    /// JSON chunk contents including trailing space padding
    pub json: &'a [u8],
    /// BIN chunk contents including trailing zero padding
    pub bin: &'a [u8],
}

impl GlbChunks<'_> {
    /// Parse the JSON chunk back into a document
    pub fn document(&self) -> Result<json::Root, EncodeError> {
        Ok(json::deserialize::from_slice(self.json)?)
    }
}

/// Split a GLB into header, JSON chunk and BIN chunk, checking magic,
/// version, declared length, chunk types and 4-byte alignment.
pub fn parse_glb(bytes: &[u8]) -> Result<GlbChunks<'_>, GlbError> {
    let header = GlbHeader::read(bytes)?;
    if header.magic != GLB_MAGIC {
        return Err(GlbError::BadMagic(header.magic));
    }
    if header.version != GLB_VERSION {
        return Err(GlbError::UnsupportedVersion(header.version));
    }
    if header.length as usize != bytes.len() {
        return Err(GlbError::LengthMismatch {
            declared: header.length,
            actual: bytes.len(),
        });
    }

    let (json, rest) = read_chunk(&bytes[HEADER_SIZE..], CHUNK_TYPE_JSON, "JSON")?;
    let (bin, _) = read_chunk(rest, CHUNK_TYPE_BIN, "BIN")?;

    Ok(GlbChunks { header, json, bin })
}

fn read_chunk<'a>(
    bytes: &'a [u8],
    expected_type: u32,
    expected: &'static str,
) -> Result<(&'a [u8], &'a [u8]), GlbError> {
    if bytes.len() < CHUNK_HEADER_SIZE {
        return Err(GlbError::Truncated(bytes.len()));
    }
    let length = read_u32(bytes, 0);
    let chunk_type = read_u32(bytes, 4);
    if chunk_type != expected_type {
        return Err(GlbError::UnexpectedChunk {
            expected,
            found: chunk_type,
        });
    }
    if length % 4 != 0 {
        return Err(GlbError::UnalignedChunk(length));
    }

    let body = &bytes[CHUNK_HEADER_SIZE..];
    let length = length as usize;
    if body.len() < length {
        return Err(GlbError::Truncated(body.len()));
    }
    Ok(body.split_at(length))
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
