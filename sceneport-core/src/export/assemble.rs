//! Assembly of gathered nodes and entities into a serializable document.

use crate::document::{canonicalize, Asset, Document, GraphNode, Node, Scene, Skin};
use crate::export::gather::ConvertedEntities;
use serde_json::Value;
use std::collections::HashMap;

/// Assembles the root document from gathered graph nodes and converted
/// entities. Node trees are flattened parent-before-children, roots in
/// scene order; pending skins resolve their joints against the flattened
/// node names.
pub fn assemble_document(
    scene_name: &str,
    roots: Vec<GraphNode>,
    entities: ConvertedEntities,
    generator: &str,
) -> Document {
    let mut nodes = Vec::new();
    let mut index_by_name = HashMap::new();
    let root_indices = roots
        .into_iter()
        .map(|root| flatten_node(root, &mut nodes, &mut index_by_name))
        .collect();

    let skins = entities
        .skins
        .into_iter()
        .map(|pending| Skin {
            inverse_bind_matrices: None,
            joints: pending
                .joint_names
                .iter()
                .filter_map(|name| index_by_name.get(name).copied())
                .collect(),
            skeleton: index_by_name.get(&pending.skeleton_name).copied(),
            name: Some(pending.name),
        })
        .collect();

    Document {
        asset: Asset {
            generator: Some(generator.to_string()),
            ..Asset::default()
        },
        cameras: entities.cameras,
        meshes: entities.meshes,
        nodes,
        scene: Some(0),
        scenes: vec![Scene {
            name: Some(scene_name.to_string()),
            nodes: root_indices,
        }],
        skins,
        ..Document::default()
    }
}

fn flatten_node(
    node: GraphNode,
    nodes: &mut Vec<Node>,
    index_by_name: &mut HashMap<String, usize>,
) -> usize {
    let index = nodes.len();
    // Reserve the slot so the parent's index precedes its children's.
    nodes.push(Node::default());
    index_by_name.entry(node.name.clone()).or_insert(index);

    let children = node
        .children
        .into_iter()
        .map(|child| flatten_node(child, nodes, index_by_name))
        .collect();

    nodes[index] = Node {
        camera: node.camera,
        children,
        extensions: node.extensions,
        extras: node.extras,
        matrix: node.matrix,
        mesh: node.mesh,
        name: Some(node.name),
        rotation: node.rotation,
        scale: node.scale,
        skin: node.skin,
        translation: node.translation,
        weights: node.weights,
    };
    index
}

/// Serializes a document to its canonical value form: null and
/// empty-array mapping entries pruned, integral floats as integers.
pub fn to_canonical_value(document: &Document) -> serde_json::Result<Value> {
    Ok(canonicalize(serde_json::to_value(document)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::gather::PendingSkin;

    fn tree(name: &str, children: Vec<GraphNode>) -> GraphNode {
        GraphNode {
            children,
            ..GraphNode::named(name)
        }
    }

    #[test]
    fn flatten_assigns_parent_before_children() {
        let roots = vec![
            tree("a", vec![tree("a1", vec![tree("a2", vec![])])]),
            tree("b", vec![]),
        ];
        let document = assemble_document("Scene", roots, ConvertedEntities::default(), "test");

        assert_eq!(document.nodes.len(), 4);
        assert_eq!(document.scenes[0].nodes, vec![0, 3]);
        assert_eq!(document.nodes[0].children, vec![1]);
        assert_eq!(document.nodes[1].children, vec![2]);
        assert_eq!(document.nodes[0].name.as_deref(), Some("a"));
        assert_eq!(document.nodes[3].name.as_deref(), Some("b"));
    }

    #[test]
    fn every_stored_index_is_in_range() {
        let roots = vec![tree("root", vec![tree("child", vec![])])];
        let entities = ConvertedEntities {
            skins: vec![PendingSkin {
                name: "rig".to_string(),
                joint_names: vec!["child".to_string(), "missing".to_string()],
                skeleton_name: "root".to_string(),
            }],
            ..ConvertedEntities::default()
        };
        let document = assemble_document("Scene", roots, entities, "test");

        for node in &document.nodes {
            for &child in &node.children {
                assert!(child < document.nodes.len());
            }
        }
        let skin = &document.skins[0];
        assert_eq!(skin.joints, vec![1]);
        assert_eq!(skin.skeleton, Some(0));
        for &joint in &skin.joints {
            assert!(joint < document.nodes.len());
        }
    }

    #[test]
    fn canonical_value_drops_empty_arrays_and_nulls() {
        let document = assemble_document(
            "Scene",
            vec![tree("only", vec![])],
            ConvertedEntities::default(),
            "test",
        );
        let value = to_canonical_value(&document).unwrap();
        let root = value.as_object().unwrap();

        assert!(!root.contains_key("accessors"));
        assert!(!root.contains_key("skins"));
        let node = &value["nodes"][0];
        assert!(node.get("matrix").is_none());
        assert!(node.get("children").is_none());
        assert_eq!(node["name"], "only");
        assert_eq!(value["scene"], 0);
    }

    #[test]
    fn asset_block_carries_version_and_generator() {
        let document =
            assemble_document("Scene", Vec::new(), ConvertedEntities::default(), "gen v1");
        assert_eq!(document.asset.version, "2.0");
        assert_eq!(document.asset.generator.as_deref(), Some("gen v1"));
    }
}
