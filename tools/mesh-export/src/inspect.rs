//! GLB inspection

use anyhow::{Context, Result};
use gltf_encoder::parse_glb;
use std::fmt;
use std::path::Path;

/// Summary of a GLB container's layout and document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlbSummary {
    pub total_length: u32,
    pub json_chunk_length: usize,
    pub bin_chunk_length: usize,
    pub buffer_byte_length: u64,
    pub generator: Option<String>,
    pub nodes: usize,
    pub meshes: usize,
    pub accessors: usize,
    pub buffer_views: usize,
}

impl fmt::Display for GlbSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "GLB v2, {} bytes", self.total_length)?;
        writeln!(f, "  JSON chunk: {} bytes", self.json_chunk_length)?;
        writeln!(
            f,
            "  BIN chunk:  {} bytes (buffer byteLength {})",
            self.bin_chunk_length, self.buffer_byte_length
        )?;
        if let Some(generator) = &self.generator {
            writeln!(f, "  Generator:  {}", generator)?;
        }
        write!(
            f,
            "  {} nodes, {} meshes, {} accessors, {} buffer views",
            self.nodes, self.meshes, self.accessors, self.buffer_views
        )
    }
}

/// Summarize GLB bytes
pub fn summarize(bytes: &[u8]) -> Result<GlbSummary> {
    let chunks = parse_glb(bytes)?;
    let root = chunks.document().context("Invalid JSON chunk")?;

    Ok(GlbSummary {
        total_length: chunks.header.length,
        json_chunk_length: chunks.json.len(),
        bin_chunk_length: chunks.bin.len(),
        buffer_byte_length: root.buffers.first().map_or(0, |b| b.byte_length.0),
        generator: root.asset.generator.clone(),
        nodes: root.nodes.len(),
        meshes: root.meshes.len(),
        accessors: root.accessors.len(),
        buffer_views: root.buffer_views.len(),
    })
}

/// Read and summarize a GLB file
pub fn inspect_file(path: &Path) -> Result<GlbSummary> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    summarize(&bytes).with_context(|| format!("Not a valid GLB: {}", path.display()))
}
