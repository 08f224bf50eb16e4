//! Test utilities for CatDep integration tests
//!
//! [`Fixture`] wires a `MemoryCatalog` to a `DeletionEngine` with a recording
//! diagnostic sink, plus helpers for registering objects and edges.

#![allow(dead_code)]

use catdep::{
    DependencyType, DeletionEngine, MemoryCatalog, MemorySink, ObjectAddress, ObjectKind, Severity,
};
use std::sync::Arc;

pub struct Fixture {
    pub catalog: Arc<MemoryCatalog>,
    pub sink: Arc<MemorySink>,
    pub engine: DeletionEngine,
}

impl Fixture {
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let catalog = Arc::new(MemoryCatalog::new());
        let sink = Arc::new(MemorySink::new());
        let engine = catalog.engine().with_diagnostics(sink.clone());
        Self {
            catalog,
            sink,
            engine,
        }
    }

    /// Register a whole object and return its address.
    pub fn object(&self, kind: ObjectKind, id: u64) -> ObjectAddress {
        self.catalog.register_object(kind, id);
        ObjectAddress::whole(kind, id)
    }

    pub fn relation(&self, id: u64) -> ObjectAddress {
        self.object(ObjectKind::Relation, id)
    }

    pub fn edge(
        &self,
        dependent: ObjectAddress,
        referenced: ObjectAddress,
        dep_type: DependencyType,
    ) {
        self.catalog.add_edge(dependent, referenced, dep_type);
    }

    /// Notice-and-above diagnostics reported so far.
    pub fn notices(&self) -> Vec<String> {
        self.sink.messages_at_least(Severity::Notice)
    }
}
