// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Expression trees and reference extraction

pub mod extract;
pub mod tree;

pub use extract::ReferenceExtractor;
pub use tree::{BoolOperator, CaseBranch, Expression, QueryTree, RangeTableEntry};
