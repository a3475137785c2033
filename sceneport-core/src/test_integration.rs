//! End-to-end tests for the conversion core: export a built-up host
//! scene, parse the produced bytes, and import them into a fresh host.

use crate::config::{ExportConfig, ImportConfig};
use crate::document::Document;
use crate::export::{export_scene, export_scene_to_path};
use crate::host::{DuplicationGroup, HostDocument, HostMesh, SceneObject};
use crate::import::{import_path, import_scene, DEFAULT_ROOT_NAME};
use glam::{Mat4, Vec3};
use tempfile::TempDir;

fn build_host() -> HostDocument {
    let mut host = HostDocument::new();

    let mesh = host.add_mesh(HostMesh::new("BodyMesh"));
    let bone = host.add_object(SceneObject::new("bone"));
    let armature = host.add_object(SceneObject {
        children: vec![bone],
        ..SceneObject::new("Rig")
    });
    host.object_mut(bone).parent = Some(armature);

    let body = host.add_object(SceneObject {
        mesh: Some(mesh),
        armature_modifier: Some(armature),
        matrix_local: Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)),
        ..SceneObject::new("Body")
    });

    let member = host.add_object(SceneObject::new("Prop"));
    let group = host.add_group(DuplicationGroup {
        members: vec![member],
        offset: Vec3::new(1.0, 0.0, 0.0),
        ..DuplicationGroup::new("Props")
    });
    let instancer = host.add_object(SceneObject {
        duplication_group: Some(group),
        ..SceneObject::new("PropAnchor")
    });

    for id in [armature, body, instancer] {
        host.link_to_scene(0, id);
    }
    host
}

#[test]
fn export_then_import_round_trip() {
    let mut host = build_host();
    let outcome = export_scene(&mut host, 0, &ExportConfig::default()).unwrap();
    assert!(outcome.node_count >= 4);
    assert_eq!(outcome.skin_count, 1);

    let document = Document::from_json_bytes(&outcome.bytes).unwrap();
    assert_eq!(document.scene, Some(0));
    assert_eq!(document.scenes.len(), 1);

    // Instancing node kept its synthesized name and negated offset.
    let instancer = document
        .nodes
        .iter()
        .find(|node| node.name.as_deref() == Some("Duplication_Offset_Props"))
        .expect("instancing node exported");
    assert_eq!(instancer.translation, Some([-1.0, 0.0, 0.0]));

    // Skin landed on the mesh node, not on the armature.
    let body = document
        .nodes
        .iter()
        .find(|node| node.name.as_deref() == Some("Body"))
        .expect("body exported");
    assert_eq!(body.skin, Some(0));
    assert!(body.mesh.is_some());

    let mut target = HostDocument::new();
    let summary = import_scene(&mut target, &document, 0, &ImportConfig::default()).unwrap();
    assert_eq!(summary.objects_created, document.nodes.len());

    let wrapper = target.object(summary.correction_root);
    assert_eq!(wrapper.name, DEFAULT_ROOT_NAME);
    assert_eq!(wrapper.children.len(), document.scenes[0].nodes.len());
}

#[test]
fn exported_bytes_survive_a_file_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("scene.gltf");

    let mut host = build_host();
    let outcome = export_scene_to_path(&mut host, 0, &ExportConfig::default(), &path).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), outcome.bytes);

    let mut target = HostDocument::new();
    let summary = import_path(&mut target, &path, &ImportConfig::default()).unwrap();
    assert_eq!(summary.objects_created, outcome.node_count);
}

#[test]
fn canonical_output_has_no_nulls_or_empty_arrays() {
    let mut host = build_host();
    let outcome = export_scene(&mut host, 0, &ExportConfig::default()).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&outcome.bytes).unwrap();

    fn check(value: &serde_json::Value) {
        match value {
            serde_json::Value::Object(members) => {
                for (key, entry) in members {
                    assert!(!entry.is_null(), "null value under key {key}");
                    if let serde_json::Value::Array(items) = entry {
                        assert!(!items.is_empty(), "empty array under key {key}");
                    }
                    check(entry);
                }
            }
            serde_json::Value::Array(items) => items.iter().for_each(check),
            _ => {}
        }
    }
    check(&value);
}

#[test]
fn selected_only_round_trip_exports_the_selection() {
    let mut host = build_host();
    // Select only the instancer; its gathered group members ride along as
    // children only if they pass the filter themselves.
    let instancer = host.scenes[0]
        .objects
        .iter()
        .copied()
        .find(|&id| host.object(id).name == "PropAnchor")
        .unwrap();
    host.object_mut(instancer).selected = true;

    let config = ExportConfig {
        selected_only: true,
        ..ExportConfig::default()
    };
    let outcome = export_scene(&mut host, 0, &config).unwrap();
    let document = Document::from_json_bytes(&outcome.bytes).unwrap();

    assert_eq!(document.nodes.len(), 1);
    assert_eq!(
        document.nodes[0].name.as_deref(),
        Some("Duplication_Offset_Props")
    );
}
