//! Integration tests for mesh-export
//!
//! Tests the full pipeline: write scene files -> convert/build -> verify output

use mesh_export::{Limits, Manifest, SceneOptions, build_all, check_all, convert_file};
use std::path::Path;
use tempfile::tempdir;

const CUBE_YAML: &str = r#"
meshes:
  - name: Cube
    vertices: [
      -1, -1, -1,   1, -1, -1,   1,  1, -1,  -1,  1, -1,
      -1, -1,  1,   1, -1,  1,   1,  1,  1,  -1,  1,  1
    ]
    indices: [
      0, 2, 1, 0, 3, 2,
      4, 5, 6, 4, 6, 7,
      0, 1, 5, 0, 5, 4,
      3, 6, 2, 3, 7, 6,
      0, 4, 7, 0, 7, 3,
      1, 2, 6, 1, 6, 5
    ]
"#;

const TRIANGLES_JSON: &str = r#"{
  "jsonConfig": {
    "meshes": [
      { "name": "Left", "vertices": [0,0,0, 1,0,0, 0,1,0], "indices": [0,1,2] },
      { "vertices": [2,0,0, 3,0,0, 2,1,0], "indices": [0,1,2],
        "uvs": [0,0, 1,0, 0,1] }
    ],
    "format": "gltf"
  }
}"#;

fn write(path: &Path, text: &str) {
    std::fs::write(path, text).expect("Failed to write test input");
}

/// YAML -> GLB next to the input
#[test]
fn test_convert_yaml_to_glb() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("cube.yaml");
    write(&input, CUBE_YAML);

    let built = convert_file(&input, None, SceneOptions::default(), &Limits::default())
        .expect("Conversion failed");
    assert_eq!(built.path, dir.path().join("cube.glb"));
    assert_eq!(built.id, "cube");
    assert_eq!(built.meshes, 1);

    let (document, buffers, _) = gltf::import(&built.path).expect("gltf import failed");
    let mesh = document.meshes().next().expect("No mesh");
    assert_eq!(mesh.name(), Some("Cube"));

    let primitive = mesh.primitives().next().expect("No primitive");
    let reader = primitive.reader(|b| buffers.get(b.index()).map(|d| &d.0[..]));
    let normals: Vec<[f32; 3]> = reader.read_normals().expect("No normals").collect();
    assert_eq!(normals.len(), 8);
    for n in normals {
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        assert!((len - 1.0).abs() < 1e-5, "normal not unit length: {:?}", n);
    }
}

/// Enveloped JSON -> .gltf with an embedded buffer, honoring the scene's format
#[test]
fn test_convert_json_to_gltf() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("pair.json");
    write(&input, TRIANGLES_JSON);

    let built = convert_file(&input, None, SceneOptions::default(), &Limits::default())
        .expect("Conversion failed");
    assert_eq!(built.path, dir.path().join("pair.gltf"));

    let text = std::fs::read_to_string(&built.path).unwrap();
    assert!(text.contains("data:application/octet-stream;base64,"));

    let (document, _, _) = gltf::import(&built.path).expect("gltf import failed");
    let names: Vec<_> = document.meshes().map(|m| m.name().map(str::to_owned)).collect();
    assert_eq!(names, vec![Some("Left".to_owned()), Some("Mesh_1".to_owned())]);
    assert_eq!(document.scenes().next().unwrap().nodes().count(), 2);
}

/// Scale and center overrides reach the encoder
#[test]
fn test_convert_with_overrides() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("cube.yml");
    let output = dir.path().join("out/big.glb");
    write(&input, CUBE_YAML);
    std::fs::create_dir_all(output.parent().unwrap()).unwrap();

    let options = SceneOptions {
        scale: Some(3.0),
        center: Some(true),
        format: None,
    };
    convert_file(&input, Some(&output), options, &Limits::default()).expect("Conversion failed");

    let (document, _, _) = gltf::import(&output).expect("gltf import failed");
    let primitive = document.meshes().next().unwrap().primitives().next().unwrap();
    let bounds = primitive.bounding_box();
    assert_eq!(bounds.min, [-3.0, -3.0, -3.0]);
    assert_eq!(bounds.max, [3.0, 3.0, 3.0]);
}

#[test]
fn test_convert_rejects_invalid_scene() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("bad.yaml");
    write(
        &input,
        "meshes:\n  - vertices: [0, 0, 0, 1, 0, 0, 0, 1, 0]\n    indices: [0, 1, 3]\n",
    );

    let err = convert_file(&input, None, SceneOptions::default(), &Limits::default())
        .expect_err("Out-of-range index should fail");
    assert!(format!("{:#}", err).contains("out of range"));
    assert!(!dir.path().join("bad.glb").exists());
}

#[test]
fn test_convert_unknown_extension() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("cube.obj");
    write(&input, CUBE_YAML);

    let err = convert_file(&input, None, SceneOptions::default(), &Limits::default())
        .expect_err("Unsupported extension should fail");
    assert!(err.to_string().contains("Unsupported scene format"));
}

/// Manifest batch: mixed formats, output dir relative to the manifest
#[test]
fn test_build_manifest() {
    let dir = tempdir().expect("Failed to create temp dir");
    write(&dir.path().join("cube.yaml"), CUBE_YAML);
    write(&dir.path().join("pair.json"), TRIANGLES_JSON);

    let manifest = Manifest::parse(
        r#"
[output]
dir = "build"

[[scenes]]
id = "cube"
path = "cube.yaml"

[[scenes]]
id = "pair"
path = "pair.json"
format = "glb"
"#,
    )
    .unwrap();

    assert_eq!(check_all(&manifest, dir.path()).unwrap(), 2);

    let built = build_all(&manifest, dir.path(), None).expect("Build failed");
    assert_eq!(built.len(), 2);

    let out = dir.path().join("build");
    for id in ["cube", "pair"] {
        let bytes = std::fs::read(out.join(format!("{id}.glb"))).unwrap();
        let summary = mesh_export::summarize(&bytes).unwrap();
        assert_eq!(summary.total_length as usize, bytes.len());
        assert_eq!(summary.buffer_byte_length as usize, summary.bin_chunk_length);
    }
    assert_eq!(built[1].meshes, 2);
}

#[test]
fn test_build_enforces_limits() {
    let dir = tempdir().expect("Failed to create temp dir");
    write(&dir.path().join("cube.yaml"), CUBE_YAML);

    let manifest = Manifest::parse(
        r#"
[limits]
max_vertices = 4

[[scenes]]
id = "cube"
path = "cube.yaml"
"#,
    )
    .unwrap();

    let err = check_all(&manifest, dir.path()).expect_err("Limit should be enforced");
    assert!(format!("{:#}", err).contains("Mesh 0 has 8 vertices (limit 4)"));

    let out = tempdir().expect("Failed to create temp dir");
    assert!(build_all(&manifest, dir.path(), Some(out.path())).is_err());
    assert!(!out.path().join("cube.glb").exists());
}

/// A `--center` value on the command line beats `center:` in the scene file
#[test]
fn test_cli_center_overrides_scene_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("offset.yaml");
    write(
        &input,
        "center: true\nmeshes:\n  - vertices: [0, 0, 0, 2, 0, 0, 0, 2, 0]\n    indices: [0, 1, 2]\n",
    );

    let run = |output: &Path, extra: &[&str]| {
        let status = std::process::Command::new(env!("CARGO_BIN_EXE_mesh-export"))
            .args(["convert", input.to_str().unwrap(), "-o", output.to_str().unwrap()])
            .args(extra)
            .status()
            .expect("Failed to run mesh-export");
        assert!(status.success(), "mesh-export convert command failed");
        let (document, _, _) = gltf::import(output).expect("gltf import failed");
        let primitive = document.meshes().next().unwrap().primitives().next().unwrap();
        primitive.bounding_box()
    };

    let centered = run(&dir.path().join("centered.glb"), &[]);
    assert_eq!(centered.min, [-1.0, -1.0, 0.0]);

    let kept = run(&dir.path().join("kept.glb"), &["--center=false"]);
    assert_eq!(kept.min, [0.0, 0.0, 0.0]);
    assert_eq!(kept.max, [2.0, 2.0, 0.0]);
}

/// NaN coordinates from YAML never reach the output
#[test]
fn test_convert_rejects_nan_coordinates() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("nan.yaml");
    write(
        &input,
        "meshes:\n  - vertices: [.nan, 0, 0, 1, 0, 0, 0, 1, 0]\n    indices: [0, 1, 2]\n",
    );

    let err = convert_file(&input, None, SceneOptions::default(), &Limits::default())
        .expect_err("NaN vertex should fail");
    assert!(format!("{:#}", err).contains("vertices[0] is not a finite number"));
    assert!(!dir.path().join("nan.glb").exists());
}

/// End-to-end through the binary
#[test]
fn test_cli_convert_and_inspect() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("cube.yaml");
    let output = dir.path().join("cube.gltf");
    write(&input, CUBE_YAML);

    let status = std::process::Command::new(env!("CARGO_BIN_EXE_mesh-export"))
        .args([
            "convert",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--format",
            "gltf",
        ])
        .status()
        .expect("Failed to run mesh-export");
    assert!(status.success(), "mesh-export convert command failed");
    assert!(output.exists());

    let glb = dir.path().join("cube.glb");
    let status = std::process::Command::new(env!("CARGO_BIN_EXE_mesh-export"))
        .args(["convert", input.to_str().unwrap()])
        .status()
        .expect("Failed to run mesh-export");
    assert!(status.success());

    let result = std::process::Command::new(env!("CARGO_BIN_EXE_mesh-export"))
        .args(["inspect", glb.to_str().unwrap()])
        .output()
        .expect("Failed to run mesh-export");
    assert!(result.status.success(), "mesh-export inspect command failed");
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.starts_with("GLB v2"));
    assert!(stdout.contains("1 meshes"));
}
