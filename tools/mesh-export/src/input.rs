//! Scene input adapters (JSON, YAML)
//!
//! Both formats end up as the same [`SceneConfig`]; nothing downstream
//! knows where a scene came from.

use anyhow::{Context, Result, bail};
use gltf_encoder::{MeshInput, OutputFormat, SceneConfig};
use serde::Deserialize;
use std::path::Path;

/// Caller overrides applied on top of whatever the input file says
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SceneOptions {
    pub scale: Option<f32>,
    pub center: Option<bool>,
    pub format: Option<OutputFormat>,
}

impl SceneOptions {
    pub fn apply(&self, mut scene: SceneConfig) -> SceneConfig {
        if let Some(scale) = self.scale {
            scene.scale = scale;
        }
        if let Some(center) = self.center {
            scene.center = center;
        }
        if let Some(format) = self.format {
            scene.format = format;
        }
        scene
    }
}

/// Key wrapping a scene in request-body style documents
const ENVELOPE_KEY: &str = "jsonConfig";

/// Parse a JSON scene, either bare or wrapped as `{ "jsonConfig": { ... } }`
pub fn scene_from_json(text: &str) -> Result<SceneConfig> {
    let mut value: serde_json::Value =
        serde_json::from_str(text).context("Invalid JSON scene")?;

    if let Some(inner) = value.get_mut(ENVELOPE_KEY) {
        value = inner.take();
    }

    serde_json::from_value(value).context("JSON does not describe a mesh scene")
}

#[derive(Debug, Deserialize)]
struct YamlScene {
    meshes: Option<Vec<MeshInput>>,
    scale: Option<f32>,
    center: Option<bool>,
    format: Option<OutputFormat>,
}

/// Parse a YAML scene. A top-level `meshes` list is required; `scale`,
/// `center` and `format` are optional and lose to `options`.
pub fn scene_from_yaml(text: &str, options: SceneOptions) -> Result<SceneConfig> {
    let parsed: YamlScene = serde_yaml::from_str(text).context("Invalid YAML format")?;

    let Some(meshes) = parsed.meshes else {
        bail!("YAML must contain a \"meshes\" property");
    };

    let mut scene = SceneConfig::new(meshes);
    if let Some(scale) = parsed.scale {
        scene.scale = scale;
    }
    if let Some(center) = parsed.center {
        scene.center = center;
    }
    if let Some(format) = parsed.format {
        scene.format = format;
    }
    Ok(options.apply(scene))
}

/// Load a scene file, choosing the parser by extension (.json, .yaml, .yml)
pub fn load_scene(path: &Path, options: SceneOptions) -> Result<SceneConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene: {}", path.display()))?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    let scene = match ext.as_str() {
        "json" => options.apply(scene_from_json(&text)?),
        "yaml" | "yml" => scene_from_yaml(&text, options)?,
        _ => bail!(
            "Unsupported scene format: {} (use .json, .yaml or .yml)",
            path.display()
        ),
    };

    tracing::debug!(
        "Loaded {} ({} meshes)",
        path.display(),
        scene.meshes.len()
    );
    Ok(scene)
}
