// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CatDep - catalog object dependency tracking and cascading drop engine
//!
//! CatDep decides, for any catalog object (table, column, function, type,
//! constraint, rule, schema, ...), what other objects must also disappear
//! when it is dropped, enforcing RESTRICT/CASCADE policy while staying
//! correct on cyclic dependency graphs.
//!
//! # Features
//!
//! - **Cascading deletion**: RESTRICT/CASCADE drop semantics with ownership
//!   (INTERNAL) redirection and auto-deletable closure pre-scanning
//! - **Cycle safety**: termination on arbitrary dependency cycles without
//!   assuming a DAG
//! - **Complete RESTRICT reporting**: every blocking dependency is surfaced
//!   in one pass, not one conflict at a time
//! - **Reference extraction**: structural walk of expression and query trees
//!   to discover the objects a computed expression depends on
//! - **Pluggable storage**: edge store, deletion dispatch and secondary
//!   cleanup are trait seams; an in-memory catalog is included
//!
//! # Usage
//!
//! ```rust,ignore
//! use catdep::{DropBehavior, MemoryCatalog, ObjectAddress, ObjectKind};
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(MemoryCatalog::new());
//! catalog.register_object(ObjectKind::Relation, 1);
//! let engine = catalog.engine();
//! engine.delete(&ObjectAddress::whole(ObjectKind::Relation, 1), DropBehavior::Cascade)?;
//! ```

pub mod catalog;
pub mod expr;
pub mod graph;

// Re-export the public API
pub use catalog::{
    identifier_kind_for_type, kind_for_class, DependencyError, DependencyResult, ObjectAddress,
    ObjectAddresses, ObjectKind,
};
pub use expr::{BoolOperator, CaseBranch, Expression, QueryTree, RangeTableEntry, ReferenceExtractor};
pub use graph::{
    CatalogLookup, CommentStore, DeletionDispatcher, DeletionEngine, DependencyEdge,
    DependencyType, DiagnosticSink, DropBehavior, EdgeId, EdgeRecord, EdgeStore, LogSink,
    MemoryCatalog, MemorySink, ObjectDescriber, PlainDescriber, Severity, SharedRefStore,
    VisibilityControl,
};

/// CatDep version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CatDep crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
