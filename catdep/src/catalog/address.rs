// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Object addresses and address sets
//!
//! An [`ObjectAddress`] names any catalog object or sub-object as a
//! `(class_id, object_id, sub_id)` triple. `sub_id` 0 means the whole object;
//! a nonzero `sub_id` names a component such as a column. A whole-object
//! address covers every sub-object address of the same object.
//!
//! [`ObjectAddresses`] is the growable, order-insensitive set used by every
//! top-level engine operation. Deduplication is amortized through a single
//! sort-and-collapse pass; operation sizes are small enough that no hashed
//! structure is warranted.

use super::classes::ObjectKind;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Address of a catalog object or one of its sub-objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectAddress {
    /// Storage class id of the catalog holding the object.
    pub class_id: u32,
    /// Row id within that catalog.
    pub object_id: u64,
    /// Component id within the object (e.g. a column number), or 0 for the
    /// whole object.
    pub sub_id: i32,
}

impl ObjectAddress {
    /// Address of a whole object of the given kind.
    pub fn whole(kind: ObjectKind, object_id: u64) -> Self {
        Self {
            class_id: kind.class_id(),
            object_id,
            sub_id: 0,
        }
    }

    /// Address of a sub-object (column, etc.) of the given kind.
    pub fn sub_object(kind: ObjectKind, object_id: u64, sub_id: i32) -> Self {
        Self {
            class_id: kind.class_id(),
            object_id,
            sub_id,
        }
    }

    /// True if both addresses name the same object, ignoring sub-object
    /// granularity.
    pub fn same_object(&self, other: &ObjectAddress) -> bool {
        self.class_id == other.class_id && self.object_id == other.object_id
    }

    /// True if this address names `other` exactly, or is a whole-object
    /// address subsuming it.
    pub fn covers(&self, other: &ObjectAddress) -> bool {
        self.same_object(other) && (self.sub_id == other.sub_id || self.sub_id == 0)
    }

    /// Ordering used by [`ObjectAddresses::dedupe`]: `sub_id` compares as
    /// unsigned so that 0 (whole object) sorts before every sub-object id.
    fn sort_key(&self) -> (u32, u64, u32) {
        (self.class_id, self.object_id, self.sub_id as u32)
    }
}

impl Ord for ObjectAddress {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for ObjectAddress {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Growable set of object addresses with covering containment semantics.
///
/// One instance lives per top-level operation (a drop request or an
/// expression scan) and is discarded when the operation completes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectAddresses {
    refs: Vec<ObjectAddress>,
}

impl ObjectAddresses {
    pub fn new() -> Self {
        Self {
            refs: Vec::with_capacity(32),
        }
    }

    /// Append an address built from a kind, object id and sub-object id.
    pub fn add(&mut self, kind: ObjectKind, object_id: u64, sub_id: i32) {
        self.refs.push(ObjectAddress {
            class_id: kind.class_id(),
            object_id,
            sub_id,
        });
    }

    /// Append an exact address.
    pub fn add_exact(&mut self, address: ObjectAddress) {
        self.refs.push(address);
    }

    /// True if `address` is present exactly, or covered by a whole-object
    /// entry for the same object.
    pub fn contains(&self, address: &ObjectAddress) -> bool {
        self.refs.iter().any(|entry| entry.covers(address))
    }

    /// Collapse duplicate and covering entries.
    ///
    /// Sorts so that entries for the same object become adjacent, with the
    /// whole-object entry (sub_id 0, unsigned ordering) first. Identical
    /// entries are dropped; a whole-object entry followed by a sub-object
    /// entry of the same object is replaced by the more specific one, since
    /// dropping the whole object subsumes all of its parts while a caller
    /// holding a column-level reference needs that granularity kept.
    pub fn dedupe(&mut self) {
        if self.refs.len() <= 1 {
            return;
        }
        self.refs.sort();

        let mut kept = 0;
        for i in 1..self.refs.len() {
            let this = self.refs[i];
            let prior = &mut self.refs[kept];
            if prior.same_object(&this) {
                if prior.sub_id == this.sub_id {
                    continue;
                }
                if prior.sub_id == 0 {
                    // Replace the whole-object marker with the specific part.
                    prior.sub_id = this.sub_id;
                    continue;
                }
            }
            kept += 1;
            self.refs[kept] = this;
        }
        self.refs.truncate(kept + 1);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectAddress> {
        self.refs.iter()
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Move every entry matching `predicate` into a new set, keeping the rest.
    pub fn partition_off(&mut self, predicate: impl Fn(&ObjectAddress) -> bool) -> ObjectAddresses {
        let mut split = ObjectAddresses::new();
        self.refs.retain(|entry| {
            if predicate(entry) {
                split.refs.push(*entry);
                false
            } else {
                true
            }
        });
        split
    }
}

impl<'a> IntoIterator for &'a ObjectAddresses {
    type Item = &'a ObjectAddress;
    type IntoIter = std::slice::Iter<'a, ObjectAddress>;

    fn into_iter(self) -> Self::IntoIter {
        self.refs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covering_containment() {
        let mut set = ObjectAddresses::new();
        set.add(ObjectKind::Relation, 10, 0);

        // A whole-object entry covers any column of the object.
        assert!(set.contains(&ObjectAddress::sub_object(ObjectKind::Relation, 10, 3)));
        assert!(set.contains(&ObjectAddress::whole(ObjectKind::Relation, 10)));
        assert!(!set.contains(&ObjectAddress::whole(ObjectKind::Relation, 11)));

        // A column-level entry does not cover the whole object.
        let mut columns = ObjectAddresses::new();
        columns.add(ObjectKind::Relation, 10, 3);
        assert!(!columns.contains(&ObjectAddress::whole(ObjectKind::Relation, 10)));
        assert!(!columns.contains(&ObjectAddress::sub_object(ObjectKind::Relation, 10, 4)));
    }

    #[test]
    fn test_dedupe_drops_identical_entries() {
        let mut set = ObjectAddresses::new();
        set.add(ObjectKind::Function, 5, 0);
        set.add(ObjectKind::Function, 5, 0);
        set.add(ObjectKind::Type, 7, 0);
        set.dedupe();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_dedupe_collapses_whole_into_part() {
        let mut set = ObjectAddresses::new();
        set.add(ObjectKind::Relation, 10, 0);
        set.add(ObjectKind::Relation, 10, 2);
        set.dedupe();

        let entries: Vec<_> = set.iter().copied().collect();
        assert_eq!(
            entries,
            vec![ObjectAddress::sub_object(ObjectKind::Relation, 10, 2)]
        );
    }

    #[test]
    fn test_dedupe_keeps_distinct_columns() {
        let mut set = ObjectAddresses::new();
        set.add(ObjectKind::Relation, 10, 2);
        set.add(ObjectKind::Relation, 10, 0);
        set.add(ObjectKind::Relation, 10, 1);
        set.dedupe();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&ObjectAddress::sub_object(ObjectKind::Relation, 10, 1)));
        assert!(set.contains(&ObjectAddress::sub_object(ObjectKind::Relation, 10, 2)));
    }

    #[test]
    fn test_negative_sub_id_sorts_after_zero() {
        // System sub-ids are negative; unsigned ordering must still put the
        // whole-object entry first so the collapse rule sees it.
        let mut set = ObjectAddresses::new();
        set.add(ObjectKind::Relation, 10, -1);
        set.add(ObjectKind::Relation, 10, 0);
        set.dedupe();

        let entries: Vec<_> = set.iter().copied().collect();
        assert_eq!(
            entries,
            vec![ObjectAddress::sub_object(ObjectKind::Relation, 10, -1)]
        );
    }

    #[test]
    fn test_partition_off() {
        let mut set = ObjectAddresses::new();
        set.add(ObjectKind::Relation, 10, 1);
        set.add(ObjectKind::Type, 3, 0);
        set.add(ObjectKind::Relation, 10, 0);

        let relation_refs =
            set.partition_off(|a| a.same_object(&ObjectAddress::whole(ObjectKind::Relation, 10)));
        assert_eq!(relation_refs.len(), 2);
        assert_eq!(set.len(), 1);
        assert!(set.contains(&ObjectAddress::whole(ObjectKind::Type, 3)));
    }
}
