// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the dependency engine

use thiserror::Error;

/// Errors surfaced by the dependency graph engine and the reference extractor.
///
/// `DependentObjectsExist` and `ProtectedObject` are the user-facing outcomes
/// of a drop request; the remaining variants indicate bugs elsewhere in the
/// system or deliberately unimplemented input shapes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyError {
    /// A RESTRICT drop found dependents, or a directly targeted object is
    /// internally owned by another object. Recoverable: the caller can retry
    /// with CASCADE or drop the named object instead.
    #[error("cannot drop {object}: {detail}")]
    DependentObjectsExist { object: String, detail: String },

    /// A PIN dependency was found: the object is required by the system and
    /// can never be dropped.
    #[error("cannot drop {0} because it is required by the database system")]
    ProtectedObject(String),

    /// Internal invariant violation (multiple INTERNAL owners, unregistered
    /// object class, out-of-range scope reference, misplaced PIN edge).
    /// Indicates a bug, not a user error.
    #[error("internal consistency violation: {0}")]
    InternalConsistency(String),

    /// An input shape this engine deliberately does not handle.
    #[error("unsupported construct: {0}")]
    UnsupportedConstruct(String),

    /// Failure reported by the underlying edge store or catalog storage.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<bincode::Error> for DependencyError {
    fn from(err: bincode::Error) -> Self {
        DependencyError::Storage(err.to_string())
    }
}

pub type DependencyResult<T> = Result<T, DependencyError>;
