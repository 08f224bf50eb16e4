// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory catalog backing for embedded use and tests
//!
//! [`MemoryCatalog`] implements every collaborator seam the engine needs:
//! edge store, deletion dispatcher, comment and shared-reference stores,
//! visibility control and catalog existence lookup. Edge mutations are
//! pending until published, matching the snapshot semantics the cascade
//! algorithm is written against: a scan keeps returning rows whose deletion
//! is pending in the current step, and stops returning them once published.

use super::edges::{DependencyEdge, DependencyType, EdgeId, EdgeRecord, EdgeStore};
use super::engine::DeletionEngine;
use super::traits::{
    CatalogLookup, CommentStore, DeletionDispatcher, SharedRefStore, VisibilityControl,
};
use crate::catalog::{
    DependencyError, DependencyResult, ObjectAddress, ObjectKind,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EdgeRow {
    edge: DependencyEdge,
    /// False until the insert is published.
    visible: bool,
    /// Deletion requested but not yet published.
    delete_pending: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogState {
    next_edge_id: u64,
    edges: BTreeMap<u64, EdgeRow>,
    /// Registered whole objects, keyed by (class_id, object_id).
    objects: HashSet<(u32, u64)>,
    comments: HashMap<ObjectAddress, Vec<String>>,
    shared_refs: HashSet<(u32, u64)>,
    /// Every dispatched deletion, in order.
    deletions: Vec<ObjectAddress>,
}

/// In-memory catalog with publish-gated edge visibility.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    inner: RwLock<CatalogState>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a [`DeletionEngine`] wired entirely to this catalog.
    pub fn engine(self: &Arc<Self>) -> DeletionEngine {
        DeletionEngine::new(
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
        )
    }

    /// Register an object so that existence probes and deletion dispatch can
    /// find it.
    pub fn register_object(&self, kind: ObjectKind, object_id: u64) {
        self.inner
            .write()
            .objects
            .insert((kind.class_id(), object_id));
    }

    /// Insert one edge and publish it immediately. Fixture setup helper; the
    /// engine's own writes go through the pending path.
    pub fn add_edge(
        &self,
        dependent: ObjectAddress,
        referenced: ObjectAddress,
        dep_type: DependencyType,
    ) {
        let mut state = self.inner.write();
        let id = state.next_edge_id;
        state.next_edge_id += 1;
        state.edges.insert(
            id,
            EdgeRow {
                edge: DependencyEdge {
                    dependent,
                    referenced,
                    dep_type,
                },
                visible: true,
                delete_pending: false,
            },
        );
    }

    pub fn contains_object(&self, kind: ObjectKind, object_id: u64) -> bool {
        self.inner
            .read()
            .objects
            .contains(&(kind.class_id(), object_id))
    }

    /// Number of published edges (pending deletions still count).
    pub fn edge_count(&self) -> usize {
        self.inner.read().edges.values().filter(|r| r.visible).count()
    }

    /// Dispatched deletions, in the order the engine performed them.
    pub fn deleted_objects(&self) -> Vec<ObjectAddress> {
        self.inner.read().deletions.clone()
    }

    pub fn add_comment(&self, address: ObjectAddress, text: &str) {
        self.inner
            .write()
            .comments
            .entry(address)
            .or_default()
            .push(text.to_string());
    }

    pub fn comments_for(&self, address: &ObjectAddress) -> Vec<String> {
        self.inner
            .read()
            .comments
            .get(address)
            .cloned()
            .unwrap_or_default()
    }

    pub fn add_shared_ref(&self, kind: ObjectKind, object_id: u64) {
        self.inner
            .write()
            .shared_refs
            .insert((kind.class_id(), object_id));
    }

    pub fn has_shared_refs(&self, kind: ObjectKind, object_id: u64) -> bool {
        self.inner
            .read()
            .shared_refs
            .contains(&(kind.class_id(), object_id))
    }

    /// Serialize the full catalog state. Together with [`Self::load`] this
    /// lets a caller emulate transaction rollback around a failed RESTRICT
    /// pass.
    pub fn save(&self) -> DependencyResult<Vec<u8>> {
        Ok(bincode::serialize(&*self.inner.read())?)
    }

    /// Replace the catalog state with a previously saved snapshot.
    pub fn load(&self, data: &[u8]) -> DependencyResult<()> {
        *self.inner.write() = bincode::deserialize(data)?;
        Ok(())
    }

    fn scan(
        &self,
        address: &ObjectAddress,
        side: fn(&DependencyEdge) -> &ObjectAddress,
    ) -> Vec<EdgeRecord> {
        self.inner
            .read()
            .edges
            .iter()
            .filter(|(_, row)| row.visible && address.covers(side(&row.edge)))
            .map(|(id, row)| EdgeRecord {
                id: EdgeId(*id),
                edge: row.edge,
            })
            .collect()
    }
}

impl EdgeStore for MemoryCatalog {
    fn scan_by_dependent(&self, address: &ObjectAddress) -> DependencyResult<Vec<EdgeRecord>> {
        Ok(self.scan(address, |edge| &edge.dependent))
    }

    fn scan_by_referenced(&self, address: &ObjectAddress) -> DependencyResult<Vec<EdgeRecord>> {
        Ok(self.scan(address, |edge| &edge.referenced))
    }

    fn edge_visible(&self, id: EdgeId) -> DependencyResult<bool> {
        Ok(self
            .inner
            .read()
            .edges
            .get(&id.0)
            .map(|row| row.visible)
            .unwrap_or(false))
    }

    fn delete_edge(&self, id: EdgeId) -> DependencyResult<()> {
        let mut state = self.inner.write();
        match state.edges.get_mut(&id.0) {
            Some(row) => {
                row.delete_pending = true;
                Ok(())
            }
            None => Err(DependencyError::Storage(format!(
                "no such edge row: {}",
                id.0
            ))),
        }
    }

    fn insert_edges(&self, edges: &[DependencyEdge]) -> DependencyResult<()> {
        let mut state = self.inner.write();
        for edge in edges {
            let id = state.next_edge_id;
            state.next_edge_id += 1;
            state.edges.insert(
                id,
                EdgeRow {
                    edge: *edge,
                    visible: false,
                    delete_pending: false,
                },
            );
        }
        Ok(())
    }
}

impl VisibilityControl for MemoryCatalog {
    fn publish_pending_changes(&self) -> DependencyResult<()> {
        let mut state = self.inner.write();
        state.edges.retain(|_, row| !row.delete_pending);
        for row in state.edges.values_mut() {
            row.visible = true;
        }
        Ok(())
    }
}

impl DeletionDispatcher for MemoryCatalog {
    fn delete_object(&self, kind: ObjectKind, address: &ObjectAddress) -> DependencyResult<()> {
        // These kinds have independent, non-cascading drop paths and must
        // never reach the dispatcher.
        if matches!(
            kind,
            ObjectKind::Role | ObjectKind::Database | ObjectKind::Tablespace
        ) {
            return Err(DependencyError::InternalConsistency(format!(
                "{} is not droppable through dependency dispatch",
                kind.display_name()
            )));
        }

        let mut state = self.inner.write();
        let key = (address.class_id, address.object_id);
        if address.sub_id != 0 {
            // Dropping a component: the parent object stays.
            if !state.objects.contains(&key) {
                return Err(DependencyError::Storage(format!(
                    "{} {} does not exist",
                    kind.display_name(),
                    address.object_id
                )));
            }
        } else if !state.objects.remove(&key) {
            return Err(DependencyError::Storage(format!(
                "{} {} does not exist",
                kind.display_name(),
                address.object_id
            )));
        }
        state.deletions.push(*address);
        Ok(())
    }
}

impl CommentStore for MemoryCatalog {
    fn delete_comments_for(&self, address: &ObjectAddress) -> DependencyResult<()> {
        let mut state = self.inner.write();
        if address.sub_id != 0 {
            state.comments.remove(address);
        } else {
            // Whole-object removal takes column comments with it.
            state.comments.retain(|key, _| !address.same_object(key));
        }
        Ok(())
    }
}

impl SharedRefStore for MemoryCatalog {
    fn delete_shared_refs_for(&self, class_id: u32, object_id: u64) -> DependencyResult<()> {
        self.inner.write().shared_refs.remove(&(class_id, object_id));
        Ok(())
    }
}

impl CatalogLookup for MemoryCatalog {
    fn object_exists(&self, kind: ObjectKind, object_id: u64) -> bool {
        self.contains_object(kind, object_id)
    }
}
