//! Standalone cell trees and structural snapshots.
//!
//! A [`CellTree`] owns its own arena and a root cell. The front end builds one
//! per memory literal; the interpreter deep-copies it into the running memory
//! whenever the literal is assigned. [`CellSnapshot`] is a plain-data image of a
//! subtree, used to compare structures and to dump memory as JSON.

use serde::{Deserialize, Serialize};

use super::error::MemoryError;
use super::memory::{CellId, Memory, Num};

/// An arena together with the root cell of the tree it holds.
#[derive(Debug, Clone)]
pub struct CellTree {
    memory: Memory,
    root: CellId,
}

impl CellTree {
    /// A single cell with no materialized children.
    pub fn new(value: Num) -> Self {
        let mut memory = Memory::new();
        let root = memory.alloc(value);
        Self { memory, root }
    }

    /// A cell whose ring holds one child per byte.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut memory = Memory::new();
        let root = memory.from_bytes(bytes);
        Self { memory, root }
    }

    /// A cell whose ring holds deep copies of `children`, in order.
    pub fn with_children<I>(children: I) -> Result<Self, MemoryError>
    where
        I: IntoIterator<Item = CellTree>,
    {
        let mut tree = Self::new(0);
        for child in children {
            tree.push_child(&child)?;
        }
        Ok(tree)
    }

    /// The memory used when a program declares none: `(0)`.
    pub fn default_memory() -> Self {
        let mut tree = Self::new(1);
        // a value-1 cell always has a child to materialize
        let _ = tree.memory.child(tree.root);
        tree
    }

    /// Append a deep copy of `child` to the root's ring.
    pub fn push_child(&mut self, child: &CellTree) -> Result<(), MemoryError> {
        let cell = self.memory.alloc(0);
        self.memory.copy_from(cell, &child.memory, child.root);
        self.memory.insert_child(self.root, cell)
    }

    pub fn root(&self) -> CellId {
        self.root
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn value(&self) -> Num {
        self.memory.value(self.root)
    }

    /// Split into arena and root, e.g. to seed a running program.
    pub fn into_parts(self) -> (Memory, CellId) {
        (self.memory, self.root)
    }

    pub fn snapshot(&self) -> CellSnapshot {
        CellSnapshot::capture(&self.memory, self.root)
    }
}

/// Structural image of a subtree.
///
/// Two subtrees are structural copies of each other exactly when their
/// snapshots are equal: same values, same materialized arcs, same anchors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub value: Num,
    /// Materialized child count.
    pub materialized: Num,
    /// Children from the anchor following `next` links.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forward: Vec<CellSnapshot>,
    /// Children before the anchor following `prev` links (open rings only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backward: Vec<CellSnapshot>,
}

impl CellSnapshot {
    pub fn capture(memory: &Memory, id: CellId) -> Self {
        let arc = memory.materialized(id);
        Self {
            value: memory.value(id),
            materialized: memory.instantiated(id),
            forward: arc.forward.iter().map(|&c| Self::capture(memory, c)).collect(),
            backward: arc.backward.iter().map(|&c| Self::capture(memory, c)).collect(),
        }
    }

    /// Leaf snapshot with no materialized children.
    pub fn leaf(value: Num) -> Self {
        Self {
            value,
            materialized: 0,
            forward: Vec::new(),
            backward: Vec::new(),
        }
    }

    /// Snapshot of a closed ring of leaves.
    pub fn ring_of(values: &[Num]) -> Self {
        Self {
            value: values.len() as Num,
            materialized: values.len() as Num,
            forward: values.iter().map(|&v| Self::leaf(v)).collect(),
            backward: Vec::new(),
        }
    }
}
