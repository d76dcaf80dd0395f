//! Traversal of a scene's node hierarchy.
//!
//! # Notes
//!
//! * Coordinate system: right-handed, +Y up, as specified by glTF.
//! * A node's local transform is its `matrix` if present, else `T * R * S`.

use nalgebra::{Isometry3, Matrix4, Quaternion, Translation3, UnitQuaternion, Vector3};

use crate::{
    document::{Document, Node, Scene},
    error::{EntityKind, Error},
};

/// A node reached while walking a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// Index of the node within the document
    pub index: usize,
    /// `None` for the scene's root nodes
    pub parent: Option<usize>,
    /// Number of ancestors
    pub depth: usize,
    /// Transform from this node's space to scene space
    pub world: Matrix4<f32>,
}

/// The transform from a node's space to its parent's.
pub fn local_transform(node: &Node) -> Matrix4<f32> {
    if let Some(matrix) = node.matrix {
        // glTF matrices are column-major
        return Matrix4::from_column_slice(&matrix);
    }
    let [tx, ty, tz] = node.translation.unwrap_or([0.0; 3]);
    let [rx, ry, rz, rw] = node
        .rotation
        .as_ref()
        .map(|r| r.0)
        .unwrap_or([0.0, 0.0, 0.0, 1.0]);
    let [sx, sy, sz] = node.scale.unwrap_or([1.0; 3]);

    let isometry = Isometry3::from_parts(
        Translation3::new(tx, ty, tz),
        UnitQuaternion::from_quaternion(Quaternion::new(rw, rx, ry, rz)),
    );
    isometry.to_homogeneous() * Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
}

/// Walk `scene` depth-first, yielding every reachable node along with its world transform.
///
/// Nodes are visited in root order, then child order. A node reachable twice is an error, since
/// glTF requires node hierarchies to be disjoint trees.
pub fn walk(doc: &Document, scene: &Scene) -> Result<Vec<SceneNode>, Error> {
    let mut visited = vec![false; doc.nodes.len()];
    let mut res = Vec::with_capacity(doc.nodes.len());
    let mut stack: Vec<(usize, Option<usize>, usize, Matrix4<f32>)> = scene
        .nodes
        .iter()
        .rev()
        .map(|&n| (n, None, 0, Matrix4::identity()))
        .collect();

    while let Some((index, parent, depth, parent_world)) = stack.pop() {
        let node = doc
            .nodes
            .get(index)
            .ok_or(Error::not_found(EntityKind::Node, index))?;
        if std::mem::replace(&mut visited[index], true) {
            return Err(Error::NodeCycle(index));
        }

        let world = parent_world * local_transform(node);
        if let Some(children) = &node.children {
            stack.extend(
                children
                    .iter()
                    .rev()
                    .map(|c| (c.value(), Some(index), depth + 1, world)),
            );
        }
        res.push(SceneNode {
            index,
            parent,
            depth,
            world,
        });
    }

    Ok(res)
}
