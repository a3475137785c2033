//! Skin wiring passes.
//!
//! Vertex groups, weights and armature modifiers are wired in three
//! separate passes; the importer runs each pass over every skin in the
//! document before starting the next, so group identity is stable before
//! anything references it.

use crate::document::Document;
use crate::host::{HostDocument, HostMesh, ObjectId};
use crate::import::ImportError;
use std::collections::HashMap;
use tracing::debug;

/// Document node indices bound to a skin that were instantiated by this
/// import, paired with their host objects.
fn instantiated_users(
    document: &Document,
    node_objects: &HashMap<usize, ObjectId>,
    skin_index: usize,
) -> Vec<(usize, ObjectId)> {
    document
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.skin == Some(skin_index))
        .filter_map(|(index, _)| node_objects.get(&index).map(|&object| (index, object)))
        .collect()
}

fn joint_group_name(document: &Document, joint: usize) -> Result<String, ImportError> {
    let node = document
        .nodes
        .get(joint)
        .ok_or(ImportError::InvalidNodeIndex(joint))?;
    Ok(node.name.clone().unwrap_or_else(|| format!("Node_{joint}")))
}

fn bound_mesh<'h>(
    host: &'h mut HostDocument,
    object: ObjectId,
    skin_index: usize,
) -> Result<&'h mut HostMesh, ImportError> {
    let mesh = host
        .object(object)
        .mesh
        .ok_or(ImportError::SkinTargetWithoutMesh(skin_index))?;
    host.mesh_mut(mesh)
        .ok_or(ImportError::SkinTargetWithoutMesh(skin_index))
}

/// Pass 1: create one vertex-group container per joint on every bound
/// mesh.
pub(crate) fn create_vertex_groups(
    host: &mut HostDocument,
    document: &Document,
    node_objects: &HashMap<usize, ObjectId>,
    skin_index: usize,
) -> Result<(), ImportError> {
    let skin = &document.skins[skin_index];
    let users = instantiated_users(document, node_objects, skin_index);
    if users.is_empty() {
        debug!(skin = skin_index, "skin is not used by the imported scene");
        return Ok(());
    }

    for (_, object) in users {
        for &joint in &skin.joints {
            let name = joint_group_name(document, joint)?;
            bound_mesh(host, object, skin_index)?.vertex_group_mut(&name);
        }
    }
    Ok(())
}

/// Pass 2: assign decoded joint influences into the groups created by
/// pass 1.
pub(crate) fn assign_vertex_weights(
    host: &mut HostDocument,
    document: &Document,
    node_objects: &HashMap<usize, ObjectId>,
    skin_index: usize,
) -> Result<(), ImportError> {
    let skin = &document.skins[skin_index];
    for (node_index, object) in instantiated_users(document, node_objects, skin_index) {
        let node = &document.nodes[node_index];
        let Some(mesh_index) = node.mesh else {
            return Err(ImportError::SkinTargetWithoutMesh(skin_index));
        };
        let mesh = document
            .meshes
            .get(mesh_index)
            .ok_or(ImportError::InvalidMeshIndex(mesh_index))?;

        for influence in &mesh.joint_influences {
            let joint = *skin
                .joints
                .get(influence.joint)
                .ok_or(ImportError::InvalidJointSlot {
                    skin: skin_index,
                    slot: influence.joint,
                })?;
            let name = joint_group_name(document, joint)?;
            bound_mesh(host, object, skin_index)?
                .vertex_group_mut(&name)
                .weights
                .push((influence.vertex, influence.weight));
        }
    }
    Ok(())
}

/// Pass 3: attach the driving armature modifier to every bound object.
pub(crate) fn attach_armature_modifiers(
    host: &mut HostDocument,
    document: &Document,
    node_objects: &HashMap<usize, ObjectId>,
    skin_index: usize,
) -> Result<(), ImportError> {
    let skin = &document.skins[skin_index];
    let users = instantiated_users(document, node_objects, skin_index);
    if users.is_empty() {
        return Ok(());
    }

    let armature_node = skin
        .skeleton
        .or_else(|| skin.joints.first().copied())
        .ok_or(ImportError::MissingSkinTarget(skin_index))?;
    let armature = *node_objects
        .get(&armature_node)
        .ok_or(ImportError::MissingSkinTarget(skin_index))?;

    for (_, object) in users {
        host.object_mut(object).armature_modifier = Some(armature);
    }
    Ok(())
}
