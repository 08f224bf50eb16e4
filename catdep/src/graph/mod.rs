// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Dependency graph storage interfaces and the cascading deletion engine

pub mod diagnostics;
pub mod edges;
pub mod engine;
pub mod memory;
pub mod traits;

pub use diagnostics::{DiagnosticSink, LogSink, MemorySink, Severity};
pub use edges::{DependencyEdge, DependencyType, DropBehavior, EdgeId, EdgeRecord, EdgeStore};
pub use engine::DeletionEngine;
pub use memory::MemoryCatalog;
pub use traits::{
    CatalogLookup, CommentStore, DeletionDispatcher, ObjectDescriber, PlainDescriber,
    SharedRefStore, VisibilityControl,
};
