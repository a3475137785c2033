//! Animation application pass.
//!
//! Curve sampling is out of scope for this core; applying an animation
//! records the binding on every targeted host object in the root's
//! subtree.

use crate::document::Document;
use crate::host::{HostDocument, ObjectId};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Applies one animation to the subtree rooted at a document node.
pub(crate) fn apply_animation(
    host: &mut HostDocument,
    document: &Document,
    node_objects: &HashMap<usize, ObjectId>,
    animation_index: usize,
    root_index: usize,
) {
    let animation = &document.animations[animation_index];
    let name = animation
        .name
        .clone()
        .unwrap_or_else(|| format!("Animation_{animation_index}"));

    let mut pending = vec![root_index];
    let mut visited = HashSet::new();
    while let Some(index) = pending.pop() {
        if !visited.insert(index) {
            continue;
        }
        let Some(node) = document.nodes.get(index) else {
            continue;
        };
        if animation.targets_node(index) {
            if let Some(&object) = node_objects.get(&index) {
                let object = host.object_mut(object);
                if !object.animations.contains(&name) {
                    debug!(animation = %name, target = %object.name, "binding animation");
                    object.animations.push(name.clone());
                }
            }
        }
        pending.extend(node.children.iter().copied());
    }
}
