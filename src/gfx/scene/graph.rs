//! # Transform Hierarchy
//!
//! A flat arena of nodes, each holding a parent reference and a chain of
//! local transform operations. World matrices are composed generically:
//!
//! ```text
//! world(node) = world(parent) * op_0 * op_1 * ... * op_n
//! ```
//!
//! Operations apply left to right in the order they are listed, the same
//! order as successive `model = model * op` multiplications.
//!
//! Parents must exist before their children are added, so the arena is
//! always topologically ordered and cycles cannot be expressed.

use cgmath::{Deg, InnerSpace, Matrix4, SquareMatrix, Vector3};

use crate::error::SceneError;

/// Index of a node inside a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single step of a local transform chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    Translate(Vector3<f32>),
    /// Fixed rotation about an axis
    Rotate { axis: Vector3<f32>, angle: Deg<f32> },
    /// Rotation about an axis by the current animation angle
    Spin { axis: Vector3<f32> },
    Scale(Vector3<f32>),
}

impl TransformOp {
    pub fn translate(x: f32, y: f32, z: f32) -> Self {
        Self::Translate(Vector3::new(x, y, z))
    }

    pub fn rotate(axis: Vector3<f32>, degrees: f32) -> Self {
        Self::Rotate {
            axis,
            angle: Deg(degrees),
        }
    }

    pub fn spin(axis: Vector3<f32>) -> Self {
        Self::Spin { axis }
    }

    pub fn uniform_scale(scale: f32) -> Self {
        Self::Scale(Vector3::new(scale, scale, scale))
    }

    /// Matrix for this step at the given animation angle
    pub fn matrix(&self, animation_angle: Deg<f32>) -> Matrix4<f32> {
        match *self {
            Self::Translate(offset) => Matrix4::from_translation(offset),
            Self::Rotate { axis, angle } => axis_rotation(axis, angle),
            Self::Spin { axis } => axis_rotation(axis, animation_angle),
            Self::Scale(s) => Matrix4::from_nonuniform_scale(s.x, s.y, s.z),
        }
    }
}

/// Rotation about an arbitrary axis; the axis does not need to be unit length.
///
/// A zero axis yields the identity.
fn axis_rotation(axis: Vector3<f32>, angle: Deg<f32>) -> Matrix4<f32> {
    if axis.magnitude2() <= f32::EPSILON {
        return Matrix4::identity();
    }
    Matrix4::from_axis_angle(axis.normalize(), angle)
}

/// Composes a chain of operations into one local matrix.
pub fn local_matrix(ops: &[TransformOp], animation_angle: Deg<f32>) -> Matrix4<f32> {
    ops.iter()
        .fold(Matrix4::identity(), |m, op| m * op.matrix(animation_angle))
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub parent: Option<NodeId>,
    pub local: Vec<TransformOp>,
}

/// Parent/child transform hierarchy for the scene
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node under `parent` (or at the root).
    ///
    /// # Errors
    /// Returns [`SceneError::UnknownNode`] if `parent` is not in this graph.
    pub fn add_node(
        &mut self,
        name: &str,
        parent: Option<NodeId>,
        local: Vec<TransformOp>,
    ) -> Result<NodeId, SceneError> {
        if let Some(parent) = parent {
            if parent.0 >= self.nodes.len() {
                return Err(SceneError::UnknownNode(parent.0));
            }
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode {
            name: name.to_string(),
            parent,
            local,
        });
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    /// Finds the first node with the given name
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name).map(NodeId)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// World matrices of every node, indexed by [`NodeId::index`].
    pub fn world_matrices(&self, animation_angle: Deg<f32>) -> Vec<Matrix4<f32>> {
        let mut world: Vec<Matrix4<f32>> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let parent = node
                .parent
                .map(|p| world[p.0])
                .unwrap_or_else(Matrix4::identity);
            world.push(parent * local_matrix(&node.local, animation_angle));
        }
        world
    }

    /// World matrix of a single node
    pub fn world_matrix(&self, id: NodeId, animation_angle: Deg<f32>) -> Option<Matrix4<f32>> {
        let node = self.nodes.get(id.0)?;
        let local = local_matrix(&node.local, animation_angle);
        match node.parent {
            Some(parent) => Some(self.world_matrix(parent, animation_angle)? * local),
            None => Some(local),
        }
    }
}
