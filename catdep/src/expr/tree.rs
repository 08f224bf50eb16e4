// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Expression and query tree structures
//!
//! The closed set of node shapes the reference extractor understands. These
//! trees arrive already built and type-resolved; this crate never parses SQL.
//! Ids are raw catalog row ids (`type_id` rows in the type catalog,
//! `function_id` rows in the function catalog, and so on).

use serde::{Deserialize, Serialize};

/// A scalar expression node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expression {
    /// Reference to a column of a range-table entry. `level` is the number of
    /// query nesting levels up the scope stack, `range_index` the entry's
    /// position in that scope, `column` the column number (0 = whole row).
    ColumnRef {
        level: usize,
        range_index: usize,
        column: i32,
    },
    /// A literal value. `value` is `None` for a null constant; for constants
    /// of a typed-identifier pseudo-type it carries the id of the object the
    /// literal names.
    Constant { type_id: u64, value: Option<u64> },
    /// Placeholder bound at execution time.
    Parameter { type_id: u64 },
    FunctionCall {
        function_id: u64,
        args: Vec<Expression>,
    },
    OperatorCall {
        operator_id: u64,
        args: Vec<Expression>,
    },
    Aggregate {
        function_id: u64,
        args: Vec<Expression>,
    },
    WindowCall {
        function_id: u64,
        args: Vec<Expression>,
    },
    /// Type coercion with no underlying function (relabel, domain coercion,
    /// row-type conversion).
    Coercion {
        result_type: u64,
        operand: Box<Expression>,
    },
    /// Row constructor producing a value of `row_type`.
    RowConstructor {
        row_type: u64,
        fields: Vec<Expression>,
    },
    /// Row-wise comparison naming one operator and operator class per column
    /// pair.
    RowCompare {
        operators: Vec<u64>,
        operator_classes: Vec<u64>,
        left: Vec<Expression>,
        right: Vec<Expression>,
    },
    BoolOp {
        op: BoolOperator,
        operands: Vec<Expression>,
    },
    Case {
        operand: Option<Box<Expression>>,
        branches: Vec<CaseBranch>,
        default: Option<Box<Expression>>,
    },
    /// Un-planned nested query.
    Subquery(Box<QueryTree>),
    /// A sub-query that has already been through the planner. Deliberately
    /// unsupported by the extractor.
    PlannedSubquery { plan_id: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoolOperator {
    And,
    Or,
    Not,
}

/// One WHEN/THEN arm of a CASE expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseBranch {
    pub condition: Expression,
    pub result: Expression,
}

/// A query tree: its name-resolution scope plus the expressions hanging off
/// it. Target list and predicate are all the substructure the extractor
/// needs; other clauses resolve to the same node shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryTree {
    pub range_tables: Vec<RangeTableEntry>,
    pub targets: Vec<Expression>,
    pub predicate: Option<Expression>,
}

/// One entry in a query's name-resolution scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RangeTableEntry {
    /// A plain relation.
    Relation { relation_id: u64 },
    /// A nested query.
    Subquery { query: Box<QueryTree> },
    /// A join; `output_columns` maps each synthetic output column back to the
    /// input expression that produces it.
    Join { output_columns: Vec<Expression> },
    /// A table-valued function call with its declared output column types.
    TableFunction {
        function: Box<Expression>,
        column_types: Vec<u64>,
    },
}
