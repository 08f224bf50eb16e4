// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Collaborator traits consumed by the deletion engine
//!
//! The engine decides *what* must be deleted; these traits are the seams to
//! the surrounding system that does the actual per-kind removal, secondary
//! record cleanup and transaction visibility. [`super::memory::MemoryCatalog`]
//! implements all of them for embedded use and tests.

use crate::catalog::{DependencyResult, ObjectAddress, ObjectKind};

/// Kind-specific object removal.
pub trait DeletionDispatcher: Send + Sync {
    /// Remove the object at `address`, whose kind the engine has already
    /// resolved through the class registry. Implementations must distinguish
    /// whole-object removal (`sub_id` 0) from sub-object removal (dropping a
    /// column rather than its table).
    ///
    /// `Role`, `Database` and `Tablespace` have independent, non-cascading
    /// drop paths and are never dispatched here; receiving one of them is an
    /// internal consistency violation and must fail loudly.
    fn delete_object(&self, kind: ObjectKind, address: &ObjectAddress) -> DependencyResult<()>;
}

/// Free-text annotations attached to objects.
pub trait CommentStore: Send + Sync {
    /// Remove every comment attached to `address`.
    fn delete_comments_for(&self, address: &ObjectAddress) -> DependencyResult<()>;
}

/// Cross-cutting shared references (e.g. role ownership records). Only
/// meaningful for whole objects; sub-objects carry no shared references.
pub trait SharedRefStore: Send + Sync {
    fn delete_shared_refs_for(&self, class_id: u32, object_id: u64) -> DependencyResult<()>;
}

/// Transaction-scope visibility control.
pub trait VisibilityControl: Send + Sync {
    /// Make writes performed earlier in the current transaction visible to
    /// subsequent reads in the same transaction. The engine calls this after
    /// unlinking edges and after deleting each object; cycle termination
    /// depends on it.
    fn publish_pending_changes(&self) -> DependencyResult<()>;
}

/// Existence probe against the catalog, used by the reference extractor to
/// skip dangling typed-identifier constants.
pub trait CatalogLookup: Send + Sync {
    fn object_exists(&self, kind: ObjectKind, object_id: u64) -> bool;
}

/// Human-readable object descriptions for diagnostics. Message formatting
/// stays outside the engine.
pub trait ObjectDescriber: Send + Sync {
    fn describe(&self, address: &ObjectAddress) -> String;
}

/// Fallback describer: renders the kind name (when the class is registered)
/// with the raw ids.
#[derive(Debug, Default)]
pub struct PlainDescriber;

impl ObjectDescriber for PlainDescriber {
    fn describe(&self, address: &ObjectAddress) -> String {
        let kind = crate::catalog::kind_for_class(address.class_id)
            .map(|k| k.display_name().to_string())
            .unwrap_or_else(|_| format!("class {}", address.class_id));
        if address.sub_id != 0 {
            format!("{} {} column {}", kind, address.object_id, address.sub_id)
        } else {
            format!("{} {}", kind, address.object_id)
        }
    }
}
