// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Dependency edge model and the edge store interface

use crate::catalog::{DependencyResult, ObjectAddress};
use serde::{Deserialize, Serialize};

/// How a dependent object relates to the object it references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyType {
    /// Ordinary reference: dropping the referenced object requires CASCADE,
    /// or fails under RESTRICT.
    Normal,
    /// The dependent may be silently dropped along with the referenced
    /// object; never counts as a RESTRICT violation.
    Auto,
    /// The dependent is an implementation part of the referenced object. A
    /// drop request reaching the dependent is redirected to its owner.
    Internal,
    /// The referenced object is required by the system and can never be
    /// dropped. PIN edges have no meaningful dependent end.
    Pin,
}

/// Drop policy requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropBehavior {
    Restrict,
    Cascade,
}

/// Directed edge: `dependent` requires `referenced` to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub dependent: ObjectAddress,
    pub referenced: ObjectAddress,
    pub dep_type: DependencyType,
}

/// Stable handle to a stored edge row, valid until the row is deleted and
/// the deletion published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

/// A scanned edge row together with its handle, so the caller can delete
/// exactly the row it is looking at.
#[derive(Debug, Clone, Copy)]
pub struct EdgeRecord {
    pub id: EdgeId,
    pub edge: DependencyEdge,
}

/// Persistent store of dependency edges, keyed by either end.
///
/// Scan matching follows the whole-object rule: an address with `sub_id` 0
/// matches edges for the whole object and all of its sub-objects; a nonzero
/// `sub_id` matches exactly. Scans must lock the returned rows against
/// concurrent modification for the duration of the enclosing transaction
/// ("for update" semantics); single-process implementations satisfy this
/// with their interior lock.
///
/// Mutations are pending until [`super::traits::VisibilityControl::publish_pending_changes`]
/// is called: scans keep returning rows whose deletion is pending, and do not
/// yet return pending inserts. The deletion engine's cycle handling relies on
/// this ordering.
pub trait EdgeStore: Send + Sync {
    /// Edges whose dependent end matches `address`.
    fn scan_by_dependent(&self, address: &ObjectAddress) -> DependencyResult<Vec<EdgeRecord>>;

    /// Edges whose referenced end matches `address`.
    fn scan_by_referenced(&self, address: &ObjectAddress) -> DependencyResult<Vec<EdgeRecord>>;

    /// Whether the row is still visible to scans. A row whose deletion was
    /// published by a nested operation stops being visible; one with a merely
    /// pending deletion does not.
    fn edge_visible(&self, id: EdgeId) -> DependencyResult<bool>;

    /// Mark one edge row deleted (pending until published).
    fn delete_edge(&self, id: EdgeId) -> DependencyResult<()>;

    /// Insert edge rows (pending until published).
    fn insert_edges(&self, edges: &[DependencyEdge]) -> DependencyResult<()>;
}
