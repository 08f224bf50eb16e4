// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cascading deletion over the dependency graph
//!
//! [`DeletionEngine`] decides, for a drop request, what else must go and in
//! what order, enforcing RESTRICT/CASCADE policy. The graph may contain
//! cycles: termination relies on removing each edge before recursing past it
//! and publishing that removal so re-entry through a cycle sees the updated
//! edge set, not on any DAG assumption.
//!
//! RESTRICT mode does not stop at the first conflict. The entire deletion
//! pass runs, each violation is reported through the diagnostic sink, and a
//! single aggregate error is returned at the top. The caller's transaction is
//! expected to roll back the speculative deletions on failure; the engine
//! performs no incremental rollback of its own.

use super::diagnostics::{DiagnosticSink, LogSink, Severity};
use super::edges::{DependencyEdge, DependencyType, DropBehavior, EdgeStore};
use super::traits::{
    CatalogLookup, CommentStore, DeletionDispatcher, ObjectDescriber, PlainDescriber,
    SharedRefStore, VisibilityControl,
};
use crate::catalog::{
    kind_for_class, DependencyError, DependencyResult, ObjectAddress, ObjectAddresses,
};
use crate::expr::{Expression, RangeTableEntry, ReferenceExtractor};
use std::sync::Arc;

/// The dependency-graph cascading deletion engine.
///
/// Holds its collaborators behind `Arc` so one catalog implementation can
/// back several seams at once. All mutation happens inside the caller's
/// transaction; the engine only orders the work and publishes visibility
/// points.
pub struct DeletionEngine {
    edges: Arc<dyn EdgeStore>,
    dispatcher: Arc<dyn DeletionDispatcher>,
    comments: Arc<dyn CommentStore>,
    shared_refs: Arc<dyn SharedRefStore>,
    visibility: Arc<dyn VisibilityControl>,
    catalog: Arc<dyn CatalogLookup>,
    describer: Arc<dyn ObjectDescriber>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl DeletionEngine {
    pub fn new(
        edges: Arc<dyn EdgeStore>,
        dispatcher: Arc<dyn DeletionDispatcher>,
        comments: Arc<dyn CommentStore>,
        shared_refs: Arc<dyn SharedRefStore>,
        visibility: Arc<dyn VisibilityControl>,
        catalog: Arc<dyn CatalogLookup>,
    ) -> Self {
        Self {
            edges,
            dispatcher,
            comments,
            shared_refs,
            visibility,
            catalog,
            describer: Arc::new(PlainDescriber),
            diagnostics: Arc::new(LogSink),
        }
    }

    /// Replace the object description formatter.
    pub fn with_describer(mut self, describer: Arc<dyn ObjectDescriber>) -> Self {
        self.describer = describer;
        self
    }

    /// Replace the diagnostics sink.
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Drop `object` and everything that must go with it.
    ///
    /// Under RESTRICT, fails with [`DependencyError::DependentObjectsExist`]
    /// if any dependent cannot be dropped implicitly; each blocking
    /// dependency is reported through the diagnostic sink before the
    /// aggregate error is returned.
    pub fn delete(&self, object: &ObjectAddress, behavior: DropBehavior) -> DependencyResult<()> {
        // Description must be captured before anything is deleted.
        let description = self.describer.describe(object);

        // Pre-scan: everything reachable purely via AUTO/INTERNAL edges is
        // implicitly droppable no matter which graph path reaches it later.
        let mut deletable = ObjectAddresses::new();
        self.find_auto_deletable(object, &mut deletable, true)?;

        let mut deleted = ObjectAddresses::new();
        if !self.cascade(
            object,
            behavior,
            Severity::Notice,
            None,
            &deletable,
            &mut deleted,
        )? {
            return Err(DependencyError::DependentObjectsExist {
                object: description,
                detail: "other objects depend on it; use DROP ... CASCADE to drop the dependent \
                         objects too"
                    .to_string(),
            });
        }
        Ok(())
    }

    /// Drop several objects as one logical operation.
    ///
    /// The auto-deletable closure is the union over all requested objects, so
    /// dropping `{A, B}` together does not fail merely because B auto-depends
    /// on A. Objects already removed by an earlier iteration's cascade, or
    /// present in the shared closure, are skipped.
    pub fn delete_many(
        &self,
        objects: &[ObjectAddress],
        behavior: DropBehavior,
    ) -> DependencyResult<()> {
        let mut implicit = ObjectAddresses::new();
        for object in objects {
            // Already reachable from a previous object; its dependents were
            // collected in that pass.
            if implicit.contains(object) {
                continue;
            }
            self.find_auto_deletable(object, &mut implicit, false)?;
        }

        let mut deleted = ObjectAddresses::new();
        for object in objects {
            if deleted.contains(object) {
                continue;
            }
            // Implicit members go away when their owner or trigger object is
            // processed; deleting them here would double-report.
            if implicit.contains(object) {
                continue;
            }

            let description = self.describer.describe(object);
            self.find_auto_deletable(object, &mut implicit, true)?;
            if !self.cascade(
                object,
                behavior,
                Severity::Notice,
                None,
                &implicit,
                &mut deleted,
            )? {
                return Err(DependencyError::DependentObjectsExist {
                    object: description,
                    detail: "other objects depend on it; use DROP ... CASCADE to drop the \
                             dependent objects too"
                        .to_string(),
                });
            }
        }
        Ok(())
    }

    /// CASCADE-drop everything that depends on `object`, keeping `object`
    /// itself. Used to empty a container such as a schema. With
    /// `show_notices` false the per-object cascade messages are demoted to
    /// debug level.
    pub fn delete_dependents(
        &self,
        object: &ObjectAddress,
        show_notices: bool,
    ) -> DependencyResult<()> {
        let description = self.describer.describe(object);

        let mut deletable = ObjectAddresses::new();
        self.find_auto_deletable(object, &mut deletable, true)?;

        let level = if show_notices {
            Severity::Notice
        } else {
            Severity::Debug2
        };
        let mut deleted = ObjectAddresses::new();
        if !self.cascade_dependents(
            object,
            &description,
            DropBehavior::Cascade,
            level,
            &deletable,
            &mut deleted,
        )? {
            return Err(DependencyError::DependentObjectsExist {
                object: description,
                detail: "failed to drop all dependent objects".to_string(),
            });
        }
        Ok(())
    }

    /// Persist one edge of `dep_type` from `depender` to each referenced
    /// address. Callers run the extractor first and hand over its result.
    pub fn record_dependencies(
        &self,
        depender: &ObjectAddress,
        referenced: &ObjectAddresses,
        dep_type: DependencyType,
    ) -> DependencyResult<()> {
        if dep_type == DependencyType::Pin {
            return Err(DependencyError::InternalConsistency(
                "PIN dependencies are created only at system bootstrap".to_string(),
            ));
        }
        if referenced.is_empty() {
            return Ok(());
        }
        let edges: Vec<DependencyEdge> = referenced
            .iter()
            .map(|address| DependencyEdge {
                dependent: *depender,
                referenced: *address,
                dep_type,
            })
            .collect();
        self.edges.insert_edges(&edges)
    }

    /// Extract the dependency set of `expr` (resolving columns through
    /// `range_tables`) and record one edge of `behavior` per referenced
    /// object. Entry point for rule and view creation.
    pub fn record_expression_dependencies(
        &self,
        depender: &ObjectAddress,
        expr: &Expression,
        range_tables: &[RangeTableEntry],
        behavior: DependencyType,
    ) -> DependencyResult<()> {
        let extractor = ReferenceExtractor::new(self.catalog.as_ref());
        let refs = extractor.extract(expr, range_tables)?;
        self.record_dependencies(depender, &refs, behavior)
    }

    /// As above for per-relation constructs (check constraints, column
    /// defaults): references to `relation_id` or its columns are recorded
    /// with `self_behavior`, everything else with `behavior`. The split is
    /// skipped when the two behaviors coincide.
    pub fn record_single_relation_dependencies(
        &self,
        depender: &ObjectAddress,
        expr: &Expression,
        relation_id: u64,
        behavior: DependencyType,
        self_behavior: DependencyType,
    ) -> DependencyResult<()> {
        let extractor = ReferenceExtractor::new(self.catalog.as_ref());
        if behavior == self_behavior {
            let scope = [RangeTableEntry::Relation { relation_id }];
            let refs = extractor.extract(expr, &scope)?;
            return self.record_dependencies(depender, &refs, behavior);
        }
        let (self_refs, other_refs) = extractor.extract_single_relation(expr, relation_id)?;
        self.record_dependencies(depender, &self_refs, self_behavior)?;
        self.record_dependencies(depender, &other_refs, behavior)
    }

    /// Collect into `deletable` every object reachable from `object` purely
    /// via AUTO/INTERNAL edges. Membership is checked before recursing, which
    /// makes this pass cycle-safe on its own.
    fn find_auto_deletable(
        &self,
        object: &ObjectAddress,
        deletable: &mut ObjectAddresses,
        include_self: bool,
    ) -> DependencyResult<()> {
        if deletable.contains(object) {
            return Ok(());
        }
        if include_self {
            deletable.add_exact(*object);
        }

        for record in self.edges.scan_by_referenced(object)? {
            match record.edge.dep_type {
                // NORMAL edges never license implicit deletion.
                DependencyType::Normal => {}
                DependencyType::Auto | DependencyType::Internal => {
                    self.find_auto_deletable(&record.edge.dependent, deletable, true)?;
                }
                DependencyType::Pin => {
                    // Nothing else is worth examining; the object can never
                    // be dropped.
                    return Err(DependencyError::ProtectedObject(
                        self.describer.describe(object),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Delete `object` plus, recursively, everything that depends on it.
    ///
    /// Returns `Ok(true)` if this subtree was deleted without a RESTRICT
    /// violation; violations are reported and the pass continues so every
    /// blocking dependency is surfaced in one shot.
    ///
    /// `calling` is `None` at the outer level, else the object we recursed
    /// from. `deletable` is the pre-scanned auto-deletable closure; it makes
    /// the outcome independent of traversal order when the same object is
    /// reachable both via a NORMAL path and an AUTO/INTERNAL path.
    fn cascade(
        &self,
        object: &ObjectAddress,
        behavior: DropBehavior,
        level: Severity,
        calling: Option<&ObjectAddress>,
        deletable: &ObjectAddresses,
        deleted: &mut ObjectAddresses,
    ) -> DependencyResult<bool> {
        let mut ok = true;
        let description = self.describer.describe(object);

        // Step 1: remove the edges linking from this object to others.
        // Removing them before recursing is the primary cycle guard, and some
        // edge types need extra handling here.
        let mut owner: Option<ObjectAddress> = None;
        for record in self.edges.scan_by_dependent(object)? {
            match record.edge.dep_type {
                DependencyType::Normal | DependencyType::Auto => {}
                DependencyType::Internal => {
                    let referenced = record.edge.referenced;
                    match calling {
                        // Top-level drop of an internally owned object: the
                        // owner is the true target, refuse outright.
                        None => {
                            let owner_desc = self.describer.describe(&referenced);
                            return Err(DependencyError::DependentObjectsExist {
                                object: description,
                                detail: format!(
                                    "{} requires it; you may drop {} instead",
                                    owner_desc, owner_desc
                                ),
                            });
                        }
                        // Recursing in from the owning side (possibly from
                        // the whole object that includes the nominal other
                        // end): carry on, the edge goes away like any other.
                        Some(caller) if caller.covers(&referenced) => {}
                        // Reached from anywhere else: redirect the drop to
                        // the owner. The INTERNAL edge stays in place so the
                        // owner's cascade finds its way back to us.
                        Some(_) => {
                            if owner.is_some() {
                                return Err(DependencyError::InternalConsistency(format!(
                                    "multiple INTERNAL dependencies for {}",
                                    description
                                )));
                            }
                            owner = Some(referenced);
                            continue;
                        }
                    }
                }
                DependencyType::Pin => {
                    // PIN rows carry no meaningful dependent end.
                    return Err(DependencyError::InternalConsistency(format!(
                        "incorrect use of PIN dependency with {}",
                        description
                    )));
                }
            }
            self.edges.delete_edge(record.id)?;
        }

        // Step 2: publish the removals. A dependency loop re-entering this
        // object must see the edges gone, or the recursion never bottoms out.
        self.visibility.publish_pending_changes()?;

        // Step 3: if something owns this object, ask it to delete itself
        // instead; its cascade will come back for us through the INTERNAL
        // edge we left in place.
        if let Some(owner) = owner {
            let owner_desc = self.describer.describe(&owner);
            if deleted.contains(&owner) || deletable.contains(&owner) {
                self.diagnostics.report(
                    Severity::Debug2,
                    &format!("drop auto-cascades to {}", owner_desc),
                );
            } else if behavior == DropBehavior::Restrict {
                self.diagnostics
                    .report(level, &format!("{} depends on {}", owner_desc, description));
                ok = false;
            } else {
                self.diagnostics
                    .report(level, &format!("drop cascades to {}", owner_desc));
            }

            if !self.cascade(&owner, behavior, level, Some(object), deletable, deleted)? {
                ok = false;
            }
            return Ok(ok);
        }

        // Step 4: recursively delete the things that depend on this object.
        // Dependents go first; their deletion routines may still need to look
        // at the referenced object.
        if !self.cascade_dependents(object, &description, behavior, level, deletable, deleted)? {
            ok = false;
        }

        // Step 5: delete the object itself, then its secondary records.
        let kind = kind_for_class(object.class_id)?;
        self.dispatcher.delete_object(kind, object)?;
        if !deleted.contains(object) {
            deleted.add_exact(*object);
        }
        self.comments.delete_comments_for(object)?;
        // Sub-objects carry no shared references.
        if object.sub_id == 0 {
            self.shared_refs
                .delete_shared_refs_for(object.class_id, object.object_id)?;
        }
        self.visibility.publish_pending_changes()?;

        Ok(ok)
    }

    /// Step 4 of the cascade, shared with [`Self::delete_dependents`]: scan
    /// the edges pointing at `object` and recursively delete each depender.
    /// The recursive calls remove the edge rows; rows deleted and published
    /// by a recursive call before we reach them are skipped, which is what
    /// keeps multiple dependency paths to the same object from deleting it
    /// twice.
    fn cascade_dependents(
        &self,
        object: &ObjectAddress,
        description: &str,
        behavior: DropBehavior,
        level: Severity,
        deletable: &ObjectAddresses,
        deleted: &mut ObjectAddresses,
    ) -> DependencyResult<bool> {
        let mut ok = true;

        for record in self.edges.scan_by_referenced(object)? {
            // A recursive call below may have already removed this row.
            if !self.edges.edge_visible(record.id)? {
                continue;
            }

            let dependent = record.edge.dependent;
            match record.edge.dep_type {
                DependencyType::Normal => {
                    let dependent_desc = self.describer.describe(&dependent);
                    if deletable.contains(&dependent) {
                        // Another dependency path would have allowed silent
                        // deletion; act as if this link were AUTO too.
                        self.diagnostics.report(
                            Severity::Debug2,
                            &format!("drop auto-cascades to {}", dependent_desc),
                        );
                    } else if behavior == DropBehavior::Restrict {
                        self.diagnostics.report(
                            level,
                            &format!("{} depends on {}", dependent_desc, description),
                        );
                        ok = false;
                    } else {
                        self.diagnostics
                            .report(level, &format!("drop cascades to {}", dependent_desc));
                    }

                    if !self.cascade(&dependent, behavior, level, Some(object), deletable, deleted)?
                    {
                        ok = false;
                    }
                }
                DependencyType::Auto | DependencyType::Internal => {
                    // Propagation is unconditional even under RESTRICT;
                    // NORMAL edges on the component can still fail the pass.
                    self.diagnostics.report(
                        Severity::Debug2,
                        &format!(
                            "drop auto-cascades to {}",
                            self.describer.describe(&dependent)
                        ),
                    );
                    if !self.cascade(&dependent, behavior, level, Some(object), deletable, deleted)?
                    {
                        ok = false;
                    }
                }
                DependencyType::Pin => {
                    return Err(DependencyError::ProtectedObject(description.to_string()));
                }
            }
        }

        Ok(ok)
    }
}
