//! mesh-export - mesh scene export tool
//!
//! Converts JSON/YAML triangle-mesh scenes to glTF 2.0 (.gltf with an
//! embedded buffer, or binary .glb)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gltf_encoder::OutputFormat;
use std::path::{Path, PathBuf};

use mesh_export::{Limits, MANIFEST_FILE, Manifest, SceneOptions, build, inspect};

#[derive(Parser)]
#[command(name = "mesh-export")]
#[command(about = "Mesh scene to glTF/GLB export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single scene file
    Convert {
        /// Input scene (.json, .yaml or .yml)
        input: PathBuf,

        /// Output file (default: input with .glb/.gltf extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: glb or gltf (overrides the scene file)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Uniform scale factor (overrides the scene file)
        #[arg(short, long)]
        scale: Option<f32>,

        /// Center each mesh on its bounding box (`--center`, `--center=false`;
        /// overrides the scene file)
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        center: Option<bool>,
    },

    /// Build scenes from a manifest file
    Build {
        /// Path to meshes.toml manifest
        #[arg(default_value = MANIFEST_FILE)]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate manifest and scenes without writing output
    Check {
        /// Path to meshes.toml manifest
        #[arg(default_value = MANIFEST_FILE)]
        manifest: PathBuf,
    },

    /// Print the layout of a GLB file
    Inspect {
        /// Input .glb file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            format,
            scale,
            center,
        } => {
            let options = SceneOptions {
                scale,
                center,
                format,
            };
            tracing::info!("Converting {:?}", input);
            let built = build::convert_file(&input, output.as_deref(), options, &Limits::default())?;
            tracing::info!(
                "Wrote {:?} ({}, {} meshes, {} bytes)",
                built.path,
                built.format,
                built.meshes,
                built.bytes
            );
        }

        Commands::Build { manifest, output } => {
            tracing::info!("Building scenes from {:?}", manifest);
            let config = Manifest::load(&manifest)?;
            let built = build::build_all(&config, manifest_dir(&manifest), output.as_deref())?;
            tracing::info!("Build complete! {} scenes", built.len());
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = Manifest::load(&manifest)?;
            let count = build::check_all(&config, manifest_dir(&manifest))
                .context("Manifest check failed")?;
            tracing::info!("Manifest is valid! {} scenes", count);
        }

        Commands::Inspect { input } => {
            let summary = inspect::inspect_file(&input)?;
            println!("{}", summary);
        }
    }

    Ok(())
}

fn manifest_dir(manifest: &Path) -> &Path {
    manifest.parent().unwrap_or_else(|| Path::new("."))
}
