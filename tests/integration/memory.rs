//! Integration tests for the ring-tree memory.
//!
//! Component: Memory
//!
//! These tests verify:
//! - Lazy materialization and ring closure
//! - Bounded materialization for large shifts
//! - Deep copies across arenas
//! - Moves between cells
//! - Snapshot serialization

#![cfg(test)]

use spherehorn::*;

mod materialization {
    use super::*;

    #[test]
    fn ring_of_five_closes_on_fifth_step() {
        // Arrange
        let mut memory = Memory::new();
        let root = memory.alloc(5);

        // Act
        let first = memory.child(root).unwrap();
        assert_eq!(memory.value(first), 0);
        assert_eq!(memory.instantiated(root), 1);

        let mut visited = vec![first];
        let mut cell = first;
        for _ in 0..4 {
            cell = memory.prev(cell).unwrap();
            assert!(!visited.contains(&cell));
            visited.push(cell);
        }

        // Assert
        assert_eq!(memory.instantiated(root), 5);
        assert!(memory.is_full(root));
        assert_eq!(memory.prev(cell).unwrap(), first);
        assert_eq!(memory.instantiated(root), 5);
    }

    #[test]
    fn huge_shift_materializes_one_ring_at_most() {
        let mut memory = Memory::new();
        let root = memory.alloc(3);
        let first = memory.child(root).unwrap();

        let target = memory.shift_forward(first, 1_000_000_000_000_000_001).unwrap();

        // 10^18 + 1 is 2 modulo 3
        assert_eq!(memory.instantiated(root), 3);
        assert!(memory.is_full(root));
        assert_eq!(memory.shift_forward(target, 1).unwrap(), first);
        assert_eq!(memory.live_cells(), 4);
    }

    #[test]
    fn misuse_is_reported_not_undefined() {
        let mut memory = Memory::new();
        let root = memory.alloc(0);

        assert_eq!(
            memory.child(root),
            Err(MemoryError::NoChildren { cell: root, value: 0 })
        );
        assert_eq!(memory.next(root), Err(MemoryError::Detached { cell: root }));
        assert_eq!(
            memory.insert_before(root, 1),
            Err(MemoryError::Detached { cell: root })
        );
    }
}

mod copying {
    use super::*;

    #[test]
    fn copy_from_literal_is_independent() {
        // Arrange
        let mut literal = CellTree::from_bytes(b"abc");
        let mut memory = Memory::new();
        let target = memory.alloc(0);

        // Act
        memory.copy_from(target, literal.memory(), literal.root());
        let root = literal.root();
        let first = literal.memory_mut().child(root).unwrap();
        literal.memory_mut().set_value(first, 0);

        // Assert
        assert_eq!(
            CellSnapshot::capture(&memory, target),
            CellSnapshot::ring_of(&[97, 98, 99])
        );
    }

    #[test]
    fn copy_keeps_position_of_destination() {
        let mut memory = Memory::new();
        let root = memory.alloc(2);
        let first = memory.child(root).unwrap();
        let second = memory.next(first).unwrap();
        let source = memory.from_bytes(b"xy");

        memory.copy_within(second, source);

        assert_eq!(memory.parent(second), Some(root));
        assert_eq!(memory.next(second).unwrap(), first);
        assert_eq!(memory.value(second), 2);
    }

    #[test]
    fn move_reparents_children() {
        let mut memory = Memory::new();
        let source = memory.from_bytes(b"hi");
        let target = memory.alloc(0);

        memory.move_within(target, source).unwrap();

        assert_eq!(memory.value(source), 2);
        assert_eq!(memory.instantiated(source), 0);
        let child = memory.child(target).unwrap();
        assert_eq!(memory.parent(child), Some(target));
        assert_eq!(
            CellSnapshot::capture(&memory, target),
            CellSnapshot::ring_of(&[104, 105])
        );
    }
}

mod snapshots {
    use super::*;

    #[test]
    fn snapshot_json_round_trip() {
        let tree = CellTree::with_children([CellTree::new(1), CellTree::from_bytes(b"ok")]).unwrap();
        let snapshot = tree.snapshot();

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: CellSnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(back, snapshot);
        assert!(json.starts_with(r#"{"value":2,"materialized":2"#));
    }
}
