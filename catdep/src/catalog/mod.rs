// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog object identity primitives
//!
//! Object addresses, address sets and the object class registry. These are
//! the leaf types everything else in the crate is built on.

pub mod address;
pub mod classes;
pub mod error;

pub use address::{ObjectAddress, ObjectAddresses};
pub use classes::{identifier_kind_for_type, kind_for_class, ObjectKind};
pub use error::{DependencyError, DependencyResult};
