//! meshes.toml manifest parsing
//!
//! A manifest lists scenes to export in one batch, the output directory,
//! and size limits enforced before any scene reaches the encoder.

use anyhow::{Context, Result, bail};
use gltf_encoder::{OutputFormat, SceneConfig};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::input::SceneOptions;

/// Default manifest file name
pub const MANIFEST_FILE: &str = "meshes.toml";

/// meshes.toml manifest structure
#[derive(Debug, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub scenes: Vec<SceneEntry>,
}

/// Output section
#[derive(Debug, Deserialize)]
pub struct OutputSection {
    /// Output directory, relative to the manifest
    /// Default: "."
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Format for scenes that don't set one
    /// Default: glb
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            format: OutputFormat::default(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Size bounds checked before encoding, to cap memory and CPU per scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Limits {
    #[serde(default = "default_max_meshes")]
    pub max_meshes: usize,
    /// Per mesh, counted in vertices (not floats)
    #[serde(default = "default_max_vertices")]
    pub max_vertices: usize,
    /// Per mesh
    #[serde(default = "default_max_indices")]
    pub max_indices: usize,
}

fn default_max_meshes() -> usize {
    256
}

fn default_max_vertices() -> usize {
    1_000_000
}

fn default_max_indices() -> usize {
    3_000_000
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_meshes: default_max_meshes(),
            max_vertices: default_max_vertices(),
            max_indices: default_max_indices(),
        }
    }
}

impl Limits {
    /// Reject scenes larger than the configured bounds
    pub fn check(&self, scene: &SceneConfig) -> Result<()> {
        if scene.meshes.len() > self.max_meshes {
            bail!(
                "Scene has {} meshes (limit {})",
                scene.meshes.len(),
                self.max_meshes
            );
        }
        for (i, mesh) in scene.meshes.iter().enumerate() {
            let vertex_count = mesh.vertices.len() / 3;
            if vertex_count > self.max_vertices {
                bail!(
                    "Mesh {} has {} vertices (limit {})",
                    i,
                    vertex_count,
                    self.max_vertices
                );
            }
            if mesh.indices.len() > self.max_indices {
                bail!(
                    "Mesh {} has {} indices (limit {})",
                    i,
                    mesh.indices.len(),
                    self.max_indices
                );
            }
        }
        Ok(())
    }
}

/// Single scene entry
#[derive(Debug, Clone, Deserialize)]
pub struct SceneEntry {
    /// Output file stem
    pub id: String,
    /// Scene file (.json/.yaml/.yml), relative to the manifest
    pub path: String,
    #[serde(default)]
    pub scale: Option<f32>,
    #[serde(default)]
    pub center: Option<bool>,
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

impl SceneEntry {
    /// Entry overrides, with the manifest default format as fallback
    pub fn options(&self, default_format: OutputFormat) -> SceneOptions {
        SceneOptions {
            scale: self.scale,
            center: self.center,
            format: Some(self.format.unwrap_or(default_format)),
        }
    }
}

impl Manifest {
    /// Load manifest from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse manifest from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse meshes.toml")
    }

    /// Check for duplicate ids and empty paths
    pub fn validate(&self) -> Result<()> {
        if self.scenes.is_empty() {
            bail!("Manifest declares no scenes");
        }
        let mut seen = HashSet::new();
        for entry in &self.scenes {
            if entry.id.is_empty() {
                bail!("Scene with path '{}' has an empty id", entry.path);
            }
            if entry.path.is_empty() {
                bail!("Scene '{}' has an empty path", entry.id);
            }
            if !seen.insert(entry.id.as_str()) {
                bail!("Duplicate scene id '{}'", entry.id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gltf_encoder::MeshInput;

    #[test]
    fn test_parse_full_manifest() {
        let manifest = Manifest::parse(
            r#"
[output]
dir = "build"
format = "gltf"

[limits]
max_meshes = 4

[[scenes]]
id = "crate"
path = "scenes/crate.yaml"
scale = 2.0
center = true

[[scenes]]
id = "tree"
path = "scenes/tree.json"
format = "glb"
"#,
        )
        .unwrap();

        assert_eq!(manifest.output.dir, PathBuf::from("build"));
        assert_eq!(manifest.output.format, OutputFormat::Gltf);
        assert_eq!(manifest.limits.max_meshes, 4);
        assert_eq!(manifest.limits.max_vertices, 1_000_000);
        assert_eq!(manifest.scenes.len(), 2);

        let crate_opts = manifest.scenes[0].options(manifest.output.format);
        assert_eq!(crate_opts.scale, Some(2.0));
        assert_eq!(crate_opts.format, Some(OutputFormat::Gltf));
        let tree_opts = manifest.scenes[1].options(manifest.output.format);
        assert_eq!(tree_opts.format, Some(OutputFormat::Glb));

        manifest.validate().unwrap();
    }

    #[test]
    fn test_defaults() {
        let manifest = Manifest::parse("").unwrap();
        assert_eq!(manifest.output.dir, PathBuf::from("."));
        assert_eq!(manifest.output.format, OutputFormat::Glb);
        assert_eq!(manifest.limits, Limits::default());
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let manifest = Manifest::parse(
            r#"
[[scenes]]
id = "a"
path = "a.json"

[[scenes]]
id = "a"
path = "b.json"
"#,
        )
        .unwrap();
        let err = manifest.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate scene id 'a'"));
    }

    #[test]
    fn test_limits_check() {
        let limits = Limits {
            max_meshes: 1,
            max_vertices: 2,
            max_indices: 3,
        };
        let mesh = MeshInput {
            vertices: vec![0.0; 9],
            indices: vec![0, 1, 2],
            ..Default::default()
        };

        let err = limits.check(&SceneConfig::new(vec![mesh.clone()])).unwrap_err();
        assert_eq!(err.to_string(), "Mesh 0 has 3 vertices (limit 2)");

        let err = limits
            .check(&SceneConfig::new(vec![mesh.clone(), mesh.clone()]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Scene has 2 meshes (limit 1)");

        assert!(Limits::default().check(&SceneConfig::new(vec![mesh])).is_ok());
    }
}
