// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Expression reference extraction
//!
//! Walks an expression or query tree and collects the address of every
//! catalog object it depends on. Used when a dependent object (default,
//! constraint, rule) is created: the resulting set is handed to the engine's
//! edge-recording entry points.
//!
//! In many cases no type dependency is recorded because an indirect one
//! exists anyway: a column reference depends on the column, which depends on
//! its type; an operator call depends on the operator, which depends on its
//! operand types. Constants, parameters and function-less coercions have no
//! such indirection, so they record their type directly.

use super::tree::{Expression, QueryTree, RangeTableEntry};
use crate::catalog::{
    identifier_kind_for_type, DependencyError, DependencyResult, ObjectAddresses, ObjectKind,
};
use crate::graph::traits::CatalogLookup;

/// Scope stack for column resolution: index 0 is the innermost query level.
type Scopes<'t> = [&'t [RangeTableEntry]];

/// Collects the catalog objects an expression or query references.
pub struct ReferenceExtractor<'a> {
    catalog: &'a dyn CatalogLookup,
}

impl<'a> ReferenceExtractor<'a> {
    /// `catalog` is probed to skip typed-identifier literals whose target no
    /// longer exists.
    pub fn new(catalog: &'a dyn CatalogLookup) -> Self {
        Self { catalog }
    }

    /// Extract the deduplicated dependency set of `expr`, resolving column
    /// references through `range_tables`.
    pub fn extract(
        &self,
        expr: &Expression,
        range_tables: &[RangeTableEntry],
    ) -> DependencyResult<ObjectAddresses> {
        let mut addrs = ObjectAddresses::new();
        self.walk_expr(expr, &[range_tables], &mut addrs)?;
        addrs.dedupe();
        Ok(addrs)
    }

    /// Extract the deduplicated dependency set of a whole query tree.
    pub fn extract_query(&self, query: &QueryTree) -> DependencyResult<ObjectAddresses> {
        let mut addrs = ObjectAddresses::new();
        self.walk_query(query, &[], &mut addrs)?;
        addrs.dedupe();
        Ok(addrs)
    }

    /// Variant for per-relation constructs (check constraints, column
    /// defaults): resolves column references against a synthetic single-entry
    /// scope around `relation_id`, then splits the result into references to
    /// `relation_id` itself (or its columns) and everything else. A
    /// constraint's dependency on its own table is recorded with a different
    /// type than its dependencies on unrelated objects.
    pub fn extract_single_relation(
        &self,
        expr: &Expression,
        relation_id: u64,
    ) -> DependencyResult<(ObjectAddresses, ObjectAddresses)> {
        let scope = [RangeTableEntry::Relation { relation_id }];
        let scopes: [&[RangeTableEntry]; 1] = [&scope];
        let mut addrs = ObjectAddresses::new();
        self.walk_expr(expr, &scopes, &mut addrs)?;
        addrs.dedupe();

        let relation_class = ObjectKind::Relation.class_id();
        let self_refs = addrs
            .partition_off(|a| a.class_id == relation_class && a.object_id == relation_id);
        Ok((self_refs, addrs))
    }

    fn walk_expr<'t>(
        &self,
        expr: &'t Expression,
        scopes: &Scopes<'t>,
        addrs: &mut ObjectAddresses,
    ) -> DependencyResult<()> {
        match expr {
            Expression::ColumnRef {
                level,
                range_index,
                column,
            } => self.resolve_column(*level, *range_index, *column, scopes, addrs),
            Expression::Constant { type_id, value } => {
                // A constant always depends on its own type.
                addrs.add(ObjectKind::Type, *type_id, 0);

                // A non-null typed-identifier literal also depends on the
                // object it names. A dangling id is silently skipped:
                // constants in dead code paths may name since-dropped objects.
                if let Some(kind) = identifier_kind_for_type(*type_id) {
                    if let Some(object_id) = value {
                        if self.catalog.object_exists(kind, *object_id) {
                            addrs.add(kind, *object_id, 0);
                        }
                    }
                }
                Ok(())
            }
            Expression::Parameter { type_id } => {
                addrs.add(ObjectKind::Type, *type_id, 0);
                Ok(())
            }
            Expression::FunctionCall { function_id, args }
            | Expression::Aggregate { function_id, args }
            | Expression::WindowCall { function_id, args } => {
                addrs.add(ObjectKind::Function, *function_id, 0);
                self.walk_all(args, scopes, addrs)
            }
            Expression::OperatorCall { operator_id, args } => {
                addrs.add(ObjectKind::Operator, *operator_id, 0);
                self.walk_all(args, scopes, addrs)
            }
            Expression::Coercion {
                result_type,
                operand,
            } => {
                // No function is invoked, so nothing else would capture the
                // type requirement.
                addrs.add(ObjectKind::Type, *result_type, 0);
                self.walk_expr(operand, scopes, addrs)
            }
            Expression::RowConstructor { row_type, fields } => {
                addrs.add(ObjectKind::Type, *row_type, 0);
                self.walk_all(fields, scopes, addrs)
            }
            Expression::RowCompare {
                operators,
                operator_classes,
                left,
                right,
            } => {
                for op in operators {
                    addrs.add(ObjectKind::Operator, *op, 0);
                }
                for opclass in operator_classes {
                    addrs.add(ObjectKind::OperatorClass, *opclass, 0);
                }
                self.walk_all(left, scopes, addrs)?;
                self.walk_all(right, scopes, addrs)
            }
            Expression::BoolOp { operands, .. } => self.walk_all(operands, scopes, addrs),
            Expression::Case {
                operand,
                branches,
                default,
            } => {
                if let Some(operand) = operand {
                    self.walk_expr(operand, scopes, addrs)?;
                }
                for branch in branches {
                    self.walk_expr(&branch.condition, scopes, addrs)?;
                    self.walk_expr(&branch.result, scopes, addrs)?;
                }
                if let Some(default) = default {
                    self.walk_expr(default, scopes, addrs)?;
                }
                Ok(())
            }
            Expression::Subquery(query) => self.walk_query(query, scopes, addrs),
            Expression::PlannedSubquery { .. } => Err(DependencyError::UnsupportedConstruct(
                "already-planned subqueries are not supported".to_string(),
            )),
        }
    }

    /// Resolve a column reference through the scope stack.
    ///
    /// A reference into a join's synthetic output is not recorded directly;
    /// the walk follows the join's own mapping back to whichever input column
    /// produced it, so unused join branches contribute no dependency.
    fn resolve_column<'t>(
        &self,
        level: usize,
        range_index: usize,
        column: i32,
        scopes: &Scopes<'t>,
        addrs: &mut ObjectAddresses,
    ) -> DependencyResult<()> {
        let range_table = *scopes.get(level).ok_or_else(|| {
            DependencyError::InternalConsistency(format!("invalid scope level {}", level))
        })?;
        let entry = range_table.get(range_index).ok_or_else(|| {
            DependencyError::InternalConsistency(format!(
                "invalid range table index {}",
                range_index
            ))
        })?;

        // A whole-row reference adds nothing: the relation-level dependency
        // recorded when the query scope is walked suffices.
        if column == 0 {
            return Ok(());
        }

        match entry {
            RangeTableEntry::Relation { relation_id } => {
                addrs.add(ObjectKind::Relation, *relation_id, column);
                Ok(())
            }
            RangeTableEntry::Join { output_columns } => {
                let index = usize::try_from(column - 1).ok().filter(|i| *i < output_columns.len());
                let output = match index {
                    Some(i) => &output_columns[i],
                    None => {
                        return Err(DependencyError::InternalConsistency(format!(
                            "invalid join column {}",
                            column
                        )))
                    }
                };
                // The join's output expressions live at the join's own level.
                self.walk_expr(output, &scopes[level..], addrs)
            }
            // Subquery and table-function outputs are covered by walking the
            // entry itself when its query scope is processed.
            _ => Ok(()),
        }
    }

    fn walk_query<'t>(
        &self,
        query: &'t QueryTree,
        scopes: &Scopes<'t>,
        addrs: &mut ObjectAddresses,
    ) -> DependencyResult<()> {
        // Whole-relation refs for every plain relation in this query's scope;
        // column-level detail is added where columns are actually referenced.
        // Table functions contribute their declared output types.
        for entry in &query.range_tables {
            match entry {
                RangeTableEntry::Relation { relation_id } => {
                    addrs.add(ObjectKind::Relation, *relation_id, 0);
                }
                RangeTableEntry::TableFunction { column_types, .. } => {
                    for type_id in column_types {
                        addrs.add(ObjectKind::Type, *type_id, 0);
                    }
                }
                _ => {}
            }
        }

        let mut inner: Vec<&'t [RangeTableEntry]> = Vec::with_capacity(scopes.len() + 1);
        inner.push(&query.range_tables);
        inner.extend_from_slice(scopes);

        // Walk the substructure. Join output-column lists are deliberately
        // not walked here; they are chased per-column on use.
        for entry in &query.range_tables {
            match entry {
                RangeTableEntry::Subquery { query } => {
                    self.walk_query(query, &inner, addrs)?;
                }
                RangeTableEntry::TableFunction { function, .. } => {
                    self.walk_expr(function, &inner, addrs)?;
                }
                _ => {}
            }
        }
        for target in &query.targets {
            self.walk_expr(target, &inner, addrs)?;
        }
        if let Some(predicate) = &query.predicate {
            self.walk_expr(predicate, &inner, addrs)?;
        }
        Ok(())
    }

    fn walk_all<'t>(
        &self,
        exprs: &'t [Expression],
        scopes: &Scopes<'t>,
        addrs: &mut ObjectAddresses,
    ) -> DependencyResult<()> {
        for expr in exprs {
            self.walk_expr(expr, scopes, addrs)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::classes::identifier_types;
    use crate::catalog::ObjectAddress;
    use crate::expr::tree::BoolOperator;
    use std::collections::HashSet;

    struct FixedCatalog {
        existing: HashSet<(ObjectKind, u64)>,
    }

    impl FixedCatalog {
        fn with(entries: &[(ObjectKind, u64)]) -> Self {
            Self {
                existing: entries.iter().copied().collect(),
            }
        }
    }

    impl CatalogLookup for FixedCatalog {
        fn object_exists(&self, kind: ObjectKind, object_id: u64) -> bool {
            self.existing.contains(&(kind, object_id))
        }
    }

    #[test]
    fn test_operator_call_records_operator_and_columns() {
        let catalog = FixedCatalog::with(&[]);
        let extractor = ReferenceExtractor::new(&catalog);
        let scope = [RangeTableEntry::Relation { relation_id: 10 }];

        let expr = Expression::OperatorCall {
            operator_id: 55,
            args: vec![
                Expression::ColumnRef {
                    level: 0,
                    range_index: 0,
                    column: 2,
                },
                Expression::Constant {
                    type_id: 23,
                    value: Some(0),
                },
            ],
        };

        let refs = extractor.extract(&expr, &scope).unwrap();
        assert!(refs.contains(&ObjectAddress::whole(ObjectKind::Operator, 55)));
        assert!(refs.contains(&ObjectAddress::sub_object(ObjectKind::Relation, 10, 2)));
        assert!(refs.contains(&ObjectAddress::whole(ObjectKind::Type, 23)));
    }

    #[test]
    fn test_whole_row_reference_adds_nothing() {
        let catalog = FixedCatalog::with(&[]);
        let extractor = ReferenceExtractor::new(&catalog);
        let scope = [RangeTableEntry::Relation { relation_id: 10 }];

        let expr = Expression::ColumnRef {
            level: 0,
            range_index: 0,
            column: 0,
        };
        let refs = extractor.extract(&expr, &scope).unwrap();
        assert!(refs.is_empty());
    }

    #[test]
    fn test_dangling_identifier_literal_is_skipped() {
        let catalog = FixedCatalog::with(&[(ObjectKind::Function, 77)]);
        let extractor = ReferenceExtractor::new(&catalog);

        // Names function 901, which no longer exists.
        let dangling = Expression::Constant {
            type_id: identifier_types::FUNCTION,
            value: Some(901),
        };
        let refs = extractor.extract(&dangling, &[]).unwrap();
        let entries: Vec<_> = refs.iter().copied().collect();
        assert_eq!(
            entries,
            vec![ObjectAddress::whole(ObjectKind::Type, identifier_types::FUNCTION)]
        );

        // Names function 77, which exists.
        let live = Expression::Constant {
            type_id: identifier_types::FUNCTION,
            value: Some(77),
        };
        let refs = extractor.extract(&live, &[]).unwrap();
        assert!(refs.contains(&ObjectAddress::whole(ObjectKind::Function, 77)));
    }

    #[test]
    fn test_null_identifier_literal_only_depends_on_type() {
        let catalog = FixedCatalog::with(&[(ObjectKind::Relation, 5)]);
        let extractor = ReferenceExtractor::new(&catalog);
        let expr = Expression::Constant {
            type_id: identifier_types::RELATION,
            value: None,
        };
        let refs = extractor.extract(&expr, &[]).unwrap();
        assert_eq!(refs.len(), 1);
    }

    #[test]
    fn test_row_compare_records_operators_and_opclasses() {
        let catalog = FixedCatalog::with(&[]);
        let extractor = ReferenceExtractor::new(&catalog);
        let expr = Expression::RowCompare {
            operators: vec![31, 32],
            operator_classes: vec![41],
            left: vec![Expression::Parameter { type_id: 23 }],
            right: vec![Expression::Parameter { type_id: 23 }],
        };
        let refs = extractor.extract(&expr, &[]).unwrap();
        assert!(refs.contains(&ObjectAddress::whole(ObjectKind::Operator, 31)));
        assert!(refs.contains(&ObjectAddress::whole(ObjectKind::Operator, 32)));
        assert!(refs.contains(&ObjectAddress::whole(ObjectKind::OperatorClass, 41)));
        assert!(refs.contains(&ObjectAddress::whole(ObjectKind::Type, 23)));
    }

    #[test]
    fn test_invalid_scope_level_is_internal_error() {
        let catalog = FixedCatalog::with(&[]);
        let extractor = ReferenceExtractor::new(&catalog);
        let expr = Expression::ColumnRef {
            level: 3,
            range_index: 0,
            column: 1,
        };
        let err = extractor.extract(&expr, &[]).unwrap_err();
        assert!(matches!(err, DependencyError::InternalConsistency(_)));
    }

    #[test]
    fn test_planned_subquery_is_unsupported() {
        let catalog = FixedCatalog::with(&[]);
        let extractor = ReferenceExtractor::new(&catalog);
        let expr = Expression::BoolOp {
            op: BoolOperator::And,
            operands: vec![Expression::PlannedSubquery { plan_id: 1 }],
        };
        let err = extractor.extract(&expr, &[]).unwrap_err();
        assert!(matches!(err, DependencyError::UnsupportedConstruct(_)));
    }

    #[test]
    fn test_single_relation_split() {
        let catalog = FixedCatalog::with(&[]);
        let extractor = ReferenceExtractor::new(&catalog);

        // column 1 of the relation itself, plus an unrelated function call
        let expr = Expression::FunctionCall {
            function_id: 88,
            args: vec![Expression::ColumnRef {
                level: 0,
                range_index: 0,
                column: 1,
            }],
        };
        let (self_refs, other_refs) = extractor.extract_single_relation(&expr, 10).unwrap();
        assert!(self_refs.contains(&ObjectAddress::sub_object(ObjectKind::Relation, 10, 1)));
        assert_eq!(self_refs.len(), 1);
        assert!(other_refs.contains(&ObjectAddress::whole(ObjectKind::Function, 88)));
        assert_eq!(other_refs.len(), 1);
    }
}
