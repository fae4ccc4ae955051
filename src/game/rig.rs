//! Operator Rig
//!
//! The anchor mirrors the operator's hand gesture rather than its absolute
//! pose. The operator's root and limb live in a [`TransformStore`] owned by
//! the host; the arm only keeps [`NodeId`] handles into it, so it never
//! controls their lifetime. Handles are resolved once, from the names in
//! [`RigBinding`], and a missing node refuses activation.
//!
//! # Mirroring
//!
//! ```text
//! relative = inverse(operator_root) * operator_limb
//! anchor_limb = anchor_root * relative
//! ```

use std::collections::HashMap;

use thiserror::Error;

use crate::game::config::RigBinding;
use crate::physics::Transform;

/// Errors raised while binding the operator rig.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RigError {
    #[error("required {role} node `{name}` not found in scene")]
    MissingNode { role: &'static str, name: String },
}

/// Handle to a node in a [`TransformStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Named world transforms written by the host every tick.
///
/// Removing a node leaves its slot empty, so stale handles read `None`
/// instead of aliasing a newer node.
#[derive(Debug, Clone, Default)]
pub struct TransformStore {
    nodes: Vec<Option<Transform>>,
    names: HashMap<String, NodeId>,
}

impl TransformStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a named node.
    pub fn insert(&mut self, name: impl Into<String>, transform: Transform) -> NodeId {
        let name = name.into();
        if let Some(&id) = self.names.get(&name) {
            self.nodes[id.0] = Some(transform);
            return id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(transform));
        self.names.insert(name, id);
        id
    }

    /// Update a live node. Returns false if the node was removed.
    pub fn set(&mut self, id: NodeId, transform: Transform) -> bool {
        match self.nodes.get_mut(id.0) {
            Some(slot @ Some(_)) => {
                *slot = Some(transform);
                true
            }
            _ => false,
        }
    }

    /// Current transform of a node.
    pub fn get(&self, id: NodeId) -> Option<Transform> {
        self.nodes.get(id.0).copied().flatten()
    }

    /// Look up a node by name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.names
            .get(name)
            .copied()
            .filter(|id| self.nodes[id.0].is_some())
    }

    /// Remove a node. Existing handles stop resolving.
    pub fn remove(&mut self, name: &str) -> Option<Transform> {
        let id = self.names.remove(name)?;
        self.nodes[id.0].take()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// True if no node is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolved handles to the operator root and the mirrored limb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceRig {
    root: NodeId,
    limb: NodeId,
}

impl ReferenceRig {
    /// Resolve the binding's node names. Fails if either node is absent.
    pub fn resolve(binding: &RigBinding, store: &TransformStore) -> Result<Self, RigError> {
        let root = store
            .find(&binding.operator_root)
            .ok_or_else(|| RigError::MissingNode {
                role: "operator root",
                name: binding.operator_root.clone(),
            })?;
        let limb = store
            .find(&binding.operator_limb)
            .ok_or_else(|| RigError::MissingNode {
                role: "operator limb",
                name: binding.operator_limb.clone(),
            })?;
        Ok(Self { root, limb })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn limb(&self) -> NodeId {
        self.limb
    }

    /// This tick's operator gesture carried onto `target_root`, if both
    /// nodes still exist.
    pub fn mirror_onto(
        &self,
        store: &TransformStore,
        target_root: &Transform,
    ) -> Option<Transform> {
        let root = store.get(self.root)?;
        let limb = store.get(self.limb)?;
        Some(mirror_pose(&root, &limb, target_root))
    }
}

/// Re-express `reference_limb`'s pose relative to `reference_root` on top
/// of `target_root`.
pub fn mirror_pose(
    reference_root: &Transform,
    reference_limb: &Transform,
    target_root: &Transform,
) -> Transform {
    target_root.compose(&reference_root.relative_to_self(reference_limb))
}
