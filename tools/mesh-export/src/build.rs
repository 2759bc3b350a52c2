//! Scene conversion: single files and manifest batches

use anyhow::{Context, Result};
use gltf_encoder::{EncodedAsset, OutputFormat, encode};
use std::path::{Path, PathBuf};

use crate::input::{SceneOptions, load_scene};
use crate::manifest::{Limits, Manifest};

/// One exported file
#[derive(Debug, Clone)]
pub struct BuiltAsset {
    pub id: String,
    pub path: PathBuf,
    pub format: OutputFormat,
    pub bytes: usize,
    pub meshes: usize,
}

/// Load, limit-check and encode a scene file in memory.
///
/// Returns the encoded asset and the number of meshes it holds.
pub fn convert_to_memory(
    input: &Path,
    options: SceneOptions,
    limits: &Limits,
) -> Result<(EncodedAsset, usize)> {
    let scene = load_scene(input, options)?;
    limits
        .check(&scene)
        .with_context(|| format!("Scene exceeds limits: {}", input.display()))?;
    let asset = encode(&scene).with_context(|| format!("Failed to encode {}", input.display()))?;
    Ok((asset, scene.meshes.len()))
}

/// Convert one scene file and write the result.
///
/// With no explicit output, writes next to the input with the extension of
/// the produced format.
pub fn convert_file(
    input: &Path,
    output: Option<&Path>,
    options: SceneOptions,
    limits: &Limits,
) -> Result<BuiltAsset> {
    let (asset, meshes) = convert_to_memory(input, options, limits)?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension(asset.file_extension()));

    std::fs::write(&output, asset.as_bytes())
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let id = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    Ok(BuiltAsset {
        id,
        path: output,
        format: asset.format,
        bytes: asset.len(),
        meshes,
    })
}

/// Build every scene in the manifest, in parallel.
///
/// Paths in the manifest are relative to `manifest_dir`; `output_override`
/// replaces `[output] dir`. The first failing scene aborts the build.
pub fn build_all(
    manifest: &Manifest,
    manifest_dir: &Path,
    output_override: Option<&Path>,
) -> Result<Vec<BuiltAsset>> {
    use rayon::prelude::*;

    manifest.validate()?;

    let output_dir = output_override
        .map(Path::to_path_buf)
        .unwrap_or_else(|| manifest_dir.join(&manifest.output.dir));
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output dir: {}", output_dir.display()))?;

    let built: Result<Vec<_>> = manifest
        .scenes
        .par_iter()
        .map(|entry| {
            let input = manifest_dir.join(&entry.path);
            let options = entry.options(manifest.output.format);

            let (asset, meshes) = convert_to_memory(&input, options, &manifest.limits)
                .with_context(|| format!("Scene '{}'", entry.id))?;

            let path = output_dir.join(format!("{}.{}", entry.id, asset.file_extension()));
            std::fs::write(&path, asset.as_bytes())
                .with_context(|| format!("Failed to write {}", path.display()))?;

            Ok(BuiltAsset {
                id: entry.id.clone(),
                path,
                format: asset.format,
                bytes: asset.len(),
                meshes,
            })
        })
        .collect();
    let built = built?;

    // Print results (after parallel build completes)
    for asset in &built {
        tracing::info!(
            "  {}: {} meshes -> {} ({} bytes)",
            asset.id,
            asset.meshes,
            asset.path.display(),
            asset.bytes
        );
    }

    Ok(built)
}

/// Parse and validate every scene without writing anything
pub fn check_all(manifest: &Manifest, manifest_dir: &Path) -> Result<usize> {
    manifest.validate()?;

    for entry in &manifest.scenes {
        let input = manifest_dir.join(&entry.path);
        let scene = load_scene(&input, entry.options(manifest.output.format))
            .with_context(|| format!("Scene '{}'", entry.id))?;
        manifest
            .limits
            .check(&scene)
            .with_context(|| format!("Scene '{}' exceeds limits", entry.id))?;
        scene
            .validate()
            .with_context(|| format!("Scene '{}' is invalid", entry.id))?;
    }

    Ok(manifest.scenes.len())
}
