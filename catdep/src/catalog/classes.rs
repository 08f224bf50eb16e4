// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Object class registry
//!
//! Maps each semantic object kind to the catalog storage class that holds
//! rows of that kind, and back. The kind set is closed: adding a kind means
//! adding an enum variant, so exhaustiveness is checked statically wherever
//! the engine dispatches on kind.

use super::error::{DependencyError, DependencyResult};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Semantic kind of a catalog object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Relation,
    Function,
    Type,
    Cast,
    Constraint,
    Conversion,
    ColumnDefault,
    Language,
    Operator,
    OperatorClass,
    RewriteRule,
    Trigger,
    Schema,
    Role,
    Database,
    Tablespace,
    Filespace,
    Filesystem,
    ForeignDataWrapper,
    ForeignServer,
    UserMapping,
    ExternalProtocol,
    CompressionSpec,
}

impl ObjectKind {
    /// Every registered kind, in registry order.
    pub const ALL: [ObjectKind; 23] = [
        ObjectKind::Relation,
        ObjectKind::Function,
        ObjectKind::Type,
        ObjectKind::Cast,
        ObjectKind::Constraint,
        ObjectKind::Conversion,
        ObjectKind::ColumnDefault,
        ObjectKind::Language,
        ObjectKind::Operator,
        ObjectKind::OperatorClass,
        ObjectKind::RewriteRule,
        ObjectKind::Trigger,
        ObjectKind::Schema,
        ObjectKind::Role,
        ObjectKind::Database,
        ObjectKind::Tablespace,
        ObjectKind::Filespace,
        ObjectKind::Filesystem,
        ObjectKind::ForeignDataWrapper,
        ObjectKind::ForeignServer,
        ObjectKind::UserMapping,
        ObjectKind::ExternalProtocol,
        ObjectKind::CompressionSpec,
    ];

    /// Storage class id of the catalog that holds objects of this kind.
    pub const fn class_id(self) -> u32 {
        match self {
            ObjectKind::Relation => 1101,
            ObjectKind::Function => 1102,
            ObjectKind::Type => 1103,
            ObjectKind::Cast => 1104,
            ObjectKind::Constraint => 1105,
            ObjectKind::Conversion => 1106,
            ObjectKind::ColumnDefault => 1107,
            ObjectKind::Language => 1108,
            ObjectKind::Operator => 1109,
            ObjectKind::OperatorClass => 1110,
            ObjectKind::RewriteRule => 1111,
            ObjectKind::Trigger => 1112,
            ObjectKind::Schema => 1113,
            ObjectKind::Role => 1114,
            ObjectKind::Database => 1115,
            ObjectKind::Tablespace => 1116,
            ObjectKind::Filespace => 1117,
            ObjectKind::Filesystem => 1118,
            ObjectKind::ForeignDataWrapper => 1119,
            ObjectKind::ForeignServer => 1120,
            ObjectKind::UserMapping => 1121,
            ObjectKind::ExternalProtocol => 1122,
            ObjectKind::CompressionSpec => 1123,
        }
    }

    /// Short lowercase name used in object descriptions and diagnostics.
    pub const fn display_name(self) -> &'static str {
        match self {
            ObjectKind::Relation => "relation",
            ObjectKind::Function => "function",
            ObjectKind::Type => "type",
            ObjectKind::Cast => "cast",
            ObjectKind::Constraint => "constraint",
            ObjectKind::Conversion => "conversion",
            ObjectKind::ColumnDefault => "default value",
            ObjectKind::Language => "language",
            ObjectKind::Operator => "operator",
            ObjectKind::OperatorClass => "operator class",
            ObjectKind::RewriteRule => "rule",
            ObjectKind::Trigger => "trigger",
            ObjectKind::Schema => "schema",
            ObjectKind::Role => "role",
            ObjectKind::Database => "database",
            ObjectKind::Tablespace => "tablespace",
            ObjectKind::Filespace => "filespace",
            ObjectKind::Filesystem => "filesystem",
            ObjectKind::ForeignDataWrapper => "foreign-data wrapper",
            ObjectKind::ForeignServer => "foreign server",
            ObjectKind::UserMapping => "user mapping",
            ObjectKind::ExternalProtocol => "external protocol",
            ObjectKind::CompressionSpec => "compression specification",
        }
    }
}

/// Reverse mapping from storage class id to kind.
static CLASS_TO_KIND: Lazy<HashMap<u32, ObjectKind>> = Lazy::new(|| {
    ObjectKind::ALL
        .iter()
        .map(|kind| (kind.class_id(), *kind))
        .collect()
});

/// Resolve a storage class id back to its object kind.
///
/// An unregistered class id is an internal invariant violation: every address
/// flowing through the engine must have been built from a registered kind.
pub fn kind_for_class(class_id: u32) -> DependencyResult<ObjectKind> {
    CLASS_TO_KIND.get(&class_id).copied().ok_or_else(|| {
        DependencyError::InternalConsistency(format!("unrecognized object class: {}", class_id))
    })
}

/// Type ids of the "typed identifier" pseudo-types: values of these types
/// denote another catalog object by id (a function, operator, relation or
/// type name literal).
pub mod identifier_types {
    pub const FUNCTION: u64 = 7201;
    pub const OPERATOR: u64 = 7202;
    pub const RELATION: u64 = 7203;
    pub const TYPE: u64 = 7204;
}

/// If `type_id` is one of the typed-identifier pseudo-types, return the kind
/// of object its values name.
pub fn identifier_kind_for_type(type_id: u64) -> Option<ObjectKind> {
    match type_id {
        identifier_types::FUNCTION => Some(ObjectKind::Function),
        identifier_types::OPERATOR => Some(ObjectKind::Operator),
        identifier_types::RELATION => Some(ObjectKind::Relation),
        identifier_types::TYPE => Some(ObjectKind::Type),
        _ => None,
    }
}
