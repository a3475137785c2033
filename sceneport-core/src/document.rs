//! The interchange document schema and its canonical serialized form.
//!
//! The document is flat and index-addressed: every cross-entity reference
//! is a position in one of the top-level arrays, so the whole aggregate
//! serializes without cycles. The export pipeline first builds an owned
//! [`GraphNode`] tree and flattens it into the indexed form at assembly
//! time.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// Asset metadata block, required at the document root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Asset {
    pub version: String,
    pub generator: Option<String>,
    pub copyright: Option<String>,
}

impl Default for Asset {
    fn default() -> Self {
        Self {
            version: "2.0".to_string(),
            generator: None,
            copyright: None,
        }
    }
}

/// One node of the document's flat node array. TRS fields and `matrix`
/// are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    pub camera: Option<usize>,
    pub children: Vec<usize>,
    pub extensions: BTreeMap<String, Value>,
    pub extras: Option<Value>,
    pub matrix: Option<[f32; 16]>,
    pub mesh: Option<usize>,
    pub name: Option<String>,
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
    pub skin: Option<usize>,
    pub translation: Option<[f32; 3]>,
    pub weights: Vec<f32>,
}

/// A scene: an ordered list of root node indices.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub name: Option<String>,
    pub nodes: Vec<usize>,
}

/// Binding of mesh vertices to a joint hierarchy.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Skin {
    #[serde(rename = "inverseBindMatrices")]
    pub inverse_bind_matrices: Option<usize>,
    pub joints: Vec<usize>,
    pub name: Option<String>,
    pub skeleton: Option<usize>,
}

/// One vertex's weight toward one joint slot of a skin.
///
/// Influences are decoded from accessor data by the container layer before
/// import; they never appear in the JSON form of the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointInfluence {
    pub vertex: u32,
    /// Position in the owning skin's `joints` array.
    pub joint: usize,
    pub weight: f32,
}

/// A mesh primitive. Attribute values are accessor indices.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Primitive {
    pub attributes: BTreeMap<String, usize>,
    pub indices: Option<usize>,
    pub material: Option<usize>,
    pub mode: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Mesh {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
    pub weights: Vec<f32>,
    /// Decoded skin influences, supplied by the container layer.
    #[serde(skip)]
    pub joint_influences: Vec<JointInfluence>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub perspective: Option<Value>,
    pub orthographic: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelTarget {
    pub node: Option<usize>,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Channel {
    pub sampler: usize,
    pub target: ChannelTarget,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSampler {
    pub input: usize,
    pub output: usize,
    pub interpolation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Animation {
    pub name: Option<String>,
    pub channels: Vec<Channel>,
    pub samplers: Vec<AnimationSampler>,
}

impl Animation {
    /// True if any channel targets the given node index.
    pub fn targets_node(&self, node: usize) -> bool {
        self.channels
            .iter()
            .any(|channel| channel.target.node == Some(node))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Accessor {
    #[serde(rename = "bufferView")]
    pub buffer_view: Option<usize>,
    #[serde(rename = "byteOffset")]
    pub byte_offset: Option<usize>,
    #[serde(rename = "componentType")]
    pub component_type: u32,
    pub count: usize,
    #[serde(rename = "type")]
    pub kind: String,
    pub min: Option<Value>,
    pub max: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Buffer {
    #[serde(rename = "byteLength")]
    pub byte_length: usize,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferView {
    pub buffer: usize,
    #[serde(rename = "byteLength")]
    pub byte_length: usize,
    #[serde(rename = "byteOffset")]
    pub byte_offset: Option<usize>,
    #[serde(rename = "byteStride")]
    pub byte_stride: Option<usize>,
    pub target: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Sampler {
    pub name: Option<String>,
    #[serde(rename = "magFilter")]
    pub mag_filter: Option<u32>,
    #[serde(rename = "minFilter")]
    pub min_filter: Option<u32>,
    #[serde(rename = "wrapS")]
    pub wrap_s: Option<u32>,
    #[serde(rename = "wrapT")]
    pub wrap_t: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Texture {
    pub name: Option<String>,
    pub sampler: Option<usize>,
    pub source: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    pub name: Option<String>,
    pub uri: Option<String>,
    #[serde(rename = "mimeType")]
    pub mime_type: Option<String>,
    #[serde(rename = "bufferView")]
    pub buffer_view: Option<usize>,
}

/// A material. Conversion is out of scope here, so beyond the name the
/// content is passed through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub name: Option<String>,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

/// The root document aggregate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub accessors: Vec<Accessor>,
    pub animations: Vec<Animation>,
    pub asset: Asset,
    pub buffers: Vec<Buffer>,
    #[serde(rename = "bufferViews")]
    pub buffer_views: Vec<BufferView>,
    pub cameras: Vec<Camera>,
    pub extensions: BTreeMap<String, Value>,
    #[serde(rename = "extensionsRequired")]
    pub extensions_required: Vec<String>,
    #[serde(rename = "extensionsUsed")]
    pub extensions_used: Vec<String>,
    pub images: Vec<Image>,
    pub materials: Vec<Material>,
    pub meshes: Vec<Mesh>,
    pub nodes: Vec<Node>,
    pub samplers: Vec<Sampler>,
    pub scene: Option<usize>,
    pub scenes: Vec<Scene>,
    pub skins: Vec<Skin>,
    pub textures: Vec<Texture>,
}

impl Document {
    /// Parses a document from JSON text.
    pub fn from_json_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// One node of the interchange graph as built during export.
///
/// Children are owned; the assembler flattens the tree into [`Node`]
/// entries with child indices. Cached conversion results are cloned out of
/// the session cache, so the type is `Clone`, and `PartialEq` lets tests
/// compare results structurally.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub camera: Option<usize>,
    pub children: Vec<GraphNode>,
    pub extensions: BTreeMap<String, Value>,
    pub extras: Option<Value>,
    pub matrix: Option<[f32; 16]>,
    pub mesh: Option<usize>,
    pub name: String,
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
    pub skin: Option<usize>,
    pub translation: Option<[f32; 3]>,
    pub weights: Vec<f32>,
}

impl GraphNode {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            camera: None,
            children: Vec::new(),
            extensions: BTreeMap::new(),
            extras: None,
            matrix: None,
            mesh: None,
            name: name.into(),
            rotation: None,
            scale: None,
            skin: None,
            translation: None,
            weights: Vec::new(),
        }
    }

    /// Total number of nodes in this subtree, including self.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(GraphNode::subtree_len)
            .sum::<usize>()
    }
}

/// Canonicalizes a serialized document value.
///
/// Mapping entries whose value is null or an empty array are dropped;
/// array elements are never dropped, only canonicalized in place; floats
/// that are mathematically integral are rewritten as integers. The pass is
/// idempotent.
pub fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(members) => {
            let mut kept = Map::with_capacity(members.len());
            for (key, entry) in members {
                match &entry {
                    Value::Null => continue,
                    Value::Array(items) if items.is_empty() => continue,
                    _ => {}
                }
                kept.insert(key, canonicalize(entry));
            }
            Value::Object(kept)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        Value::Number(number) => canonicalize_number(number),
        other => other,
    }
}

fn canonicalize_number(number: Number) -> Value {
    if number.is_f64() {
        if let Some(float) = number.as_f64() {
            if float.fract() == 0.0 && float >= i64::MIN as f64 && float <= i64::MAX as f64 {
                return Value::Number(Number::from(float as i64));
            }
        }
    }
    Value::Number(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonicalize_prunes_and_rewrites() {
        let input = json!({"a": [], "b": null, "c": 2.0, "d": [1, null]});
        let expected = json!({"c": 2, "d": [1, null]});
        assert_eq!(canonicalize(input), expected);
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let input = json!({
            "asset": {"version": "2.0", "copyright": null},
            "nodes": [{"children": [], "translation": [0.0, 1.5, -3.0]}],
            "scene": 0.0,
        });
        let once = canonicalize(input);
        let twice = canonicalize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn canonicalize_recurses_into_nested_structures() {
        let input = json!({"outer": {"inner": {"drop": null, "keep": [4.0]}}});
        let expected = json!({"outer": {"inner": {"keep": [4]}}});
        assert_eq!(canonicalize(input), expected);
    }

    #[test]
    fn canonicalize_leaves_non_integral_floats_alone() {
        let input = json!({"x": 1.25});
        assert_eq!(canonicalize(input), json!({"x": 1.25}));
    }

    #[test]
    fn document_round_trips_through_json() {
        let mut document = Document::default();
        document.scene = Some(0);
        document.scenes.push(Scene {
            name: Some("Scene".to_string()),
            nodes: vec![0],
        });
        document.nodes.push(Node {
            name: Some("Cube".to_string()),
            translation: Some([1.0, 2.0, 3.0]),
            ..Node::default()
        });

        let bytes = serde_json::to_vec(&document).unwrap();
        let parsed = Document::from_json_bytes(&bytes).unwrap();
        assert_eq!(parsed, document);
    }

    #[test]
    fn document_parse_tolerates_missing_arrays() {
        let parsed =
            Document::from_json_bytes(br#"{"asset": {"version": "2.0"}, "scenes": [{}]}"#).unwrap();
        assert!(parsed.nodes.is_empty());
        assert_eq!(parsed.scenes.len(), 1);
        assert_eq!(parsed.scene, None);
    }

    #[test]
    fn subtree_len_counts_all_descendants() {
        let mut root = GraphNode::named("root");
        let mut mid = GraphNode::named("mid");
        mid.children.push(GraphNode::named("leaf"));
        root.children.push(mid);
        root.children.push(GraphNode::named("leaf2"));
        assert_eq!(root.subtree_len(), 4);
    }
}
