//! Error types for scene validation and encoding

use thiserror::Error;

/// A scene was rejected before any encoding work started.
///
/// Every variant carries enough context (mesh index, offending lengths or
/// values) to be reported back to whoever authored the scene.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("scene contains no meshes")]
    EmptyScene,

    #[error("scale must be finite, got {0}")]
    InvalidScale(f32),

    #[error("mesh {mesh}: vertices are empty")]
    EmptyVertices { mesh: usize },

    #[error("mesh {mesh}: indices are empty")]
    EmptyIndices { mesh: usize },

    #[error("mesh {mesh}: vertices length {len} is not a multiple of 3")]
    VerticesNotTriplets { mesh: usize, len: usize },

    #[error("mesh {mesh}: indices length {len} is not a multiple of 3")]
    IndicesNotTriangles { mesh: usize, len: usize },

    #[error(
        "mesh {mesh}: index {value} at position {position} is out of range ({vertex_count} vertices)"
    )]
    IndexOutOfRange {
        mesh: usize,
        position: usize,
        value: u32,
        vertex_count: usize,
    },

    #[error("mesh {mesh}: {attribute}[{position}] is not a finite number")]
    NonFiniteValue {
        mesh: usize,
        attribute: &'static str,
        position: usize,
    },

    #[error("mesh {mesh}: {attribute} length {actual} does not match expected {expected}")]
    AttributeLength {
        mesh: usize,
        attribute: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Failure while turning a scene into glTF output
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("invalid scene: {0}")]
    Validation(#[from] ValidationError),

    /// Output could not be produced: a layout invariant broke, or scaling
    /// pushed a value out of the finite range.
    #[error("encoding failed for mesh {mesh} at {stage}: {reason}")]
    Encoding {
        mesh: usize,
        stage: &'static str,
        reason: String,
    },

    #[error("malformed buffer data URI: {0}")]
    DataUri(String),

    #[error("failed to serialize glTF JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl EncodeError {
    pub(crate) fn encoding(mesh: usize, stage: &'static str, reason: impl Into<String>) -> Self {
        EncodeError::Encoding {
            mesh,
            stage,
            reason: reason.into(),
        }
    }

    /// Neither bad input nor internal defects go away on retry.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// True when the failure is the caller's fault (bad scene shape)
    pub fn is_validation(&self) -> bool {
        matches!(self, EncodeError::Validation(_))
    }
}

/// Failure while reading a GLB container back
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GlbError {
    #[error("GLB too short: {0} bytes")]
    Truncated(usize),

    #[error("bad GLB magic: {0:#010x}")]
    BadMagic(u32),

    #[error("unsupported GLB version {0}")]
    UnsupportedVersion(u32),

    #[error("GLB length field {declared} does not match actual length {actual}")]
    LengthMismatch { declared: u32, actual: usize },

    #[error("expected {expected} chunk, found type {found:#010x}")]
    UnexpectedChunk { expected: &'static str, found: u32 },

    #[error("chunk length {0} is not 4-byte aligned")]
    UnalignedChunk(u32),
}
