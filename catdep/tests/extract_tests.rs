//! Reference extractor integration tests
//!
//! Exercises the extractor against the in-memory catalog and the engine's
//! edge-recording entry points.

#[path = "testutils/mod.rs"]
mod testutils;

use catdep::{
    DependencyError, DependencyType, DropBehavior, Expression, ObjectAddress, ObjectKind,
    QueryTree, RangeTableEntry, ReferenceExtractor, VisibilityControl,
};
use testutils::Fixture;

fn column(level: usize, range_index: usize, column: i32) -> Expression {
    Expression::ColumnRef {
        level,
        range_index,
        column,
    }
}

#[test]
fn test_join_output_chases_only_used_branch() {
    let fx = Fixture::new();
    let extractor = ReferenceExtractor::new(fx.catalog.as_ref());

    // SELECT j.col1 FROM t10 JOIN t11: the join's first output column comes
    // from t10, the second from t11; only the first is referenced.
    let query = QueryTree {
        range_tables: vec![
            RangeTableEntry::Relation { relation_id: 10 },
            RangeTableEntry::Relation { relation_id: 11 },
            RangeTableEntry::Join {
                output_columns: vec![column(0, 0, 1), column(0, 1, 2)],
            },
        ],
        targets: vec![column(0, 2, 1)],
        predicate: None,
    };

    let refs = extractor.extract_query(&query).unwrap();

    // The used branch is recorded at column granularity.
    assert!(refs.contains(&ObjectAddress::sub_object(ObjectKind::Relation, 10, 1)));
    // The unused branch contributes its whole-relation scope entry only, no
    // column-level dependency.
    assert!(refs
        .iter()
        .all(|addr| addr.object_id != 11 || addr.sub_id == 0));
    assert!(refs.contains(&ObjectAddress::whole(ObjectKind::Relation, 11)));
}

#[test]
fn test_nested_query_scopes_and_outer_references() {
    let fx = Fixture::new();
    let extractor = ReferenceExtractor::new(fx.catalog.as_ref());

    // Outer query over relation 20 with a subquery over relation 21 whose
    // target reaches one level up into the outer scope.
    let inner = QueryTree {
        range_tables: vec![RangeTableEntry::Relation { relation_id: 21 }],
        targets: vec![column(1, 0, 2)],
        predicate: Some(column(0, 0, 1)),
    };
    let outer = QueryTree {
        range_tables: vec![
            RangeTableEntry::Relation { relation_id: 20 },
            RangeTableEntry::Subquery {
                query: Box::new(inner),
            },
        ],
        targets: vec![],
        predicate: None,
    };

    let refs = extractor.extract_query(&outer).unwrap();

    assert!(refs.contains(&ObjectAddress::sub_object(ObjectKind::Relation, 20, 2)));
    assert!(refs.contains(&ObjectAddress::sub_object(ObjectKind::Relation, 21, 1)));
}

#[test]
fn test_table_function_records_function_and_output_types() {
    let fx = Fixture::new();
    let extractor = ReferenceExtractor::new(fx.catalog.as_ref());

    let query = QueryTree {
        range_tables: vec![RangeTableEntry::TableFunction {
            function: Box::new(Expression::FunctionCall {
                function_id: 88,
                args: vec![],
            }),
            column_types: vec![31, 32],
        }],
        targets: vec![],
        predicate: None,
    };

    let refs = extractor.extract_query(&query).unwrap();
    assert!(refs.contains(&ObjectAddress::whole(ObjectKind::Function, 88)));
    assert!(refs.contains(&ObjectAddress::whole(ObjectKind::Type, 31)));
    assert!(refs.contains(&ObjectAddress::whole(ObjectKind::Type, 32)));
}

#[test]
fn test_planned_subquery_in_range_table_is_unsupported() {
    let fx = Fixture::new();
    let extractor = ReferenceExtractor::new(fx.catalog.as_ref());

    let query = QueryTree {
        range_tables: vec![RangeTableEntry::Relation { relation_id: 10 }],
        targets: vec![Expression::PlannedSubquery { plan_id: 7 }],
        predicate: None,
    };

    let err = extractor.extract_query(&query).unwrap_err();
    assert!(matches!(err, DependencyError::UnsupportedConstruct(_)));
}

#[test]
fn test_recorded_expression_dependencies_block_restrict_drop() {
    let fx = Fixture::new();
    let table = fx.relation(10);
    let rule = fx.object(ObjectKind::RewriteRule, 5);

    let scope = [RangeTableEntry::Relation { relation_id: 10 }];
    let expr = Expression::OperatorCall {
        operator_id: 55,
        args: vec![
            column(0, 0, 1),
            Expression::Constant {
                type_id: 23,
                value: None,
            },
        ],
    };
    fx.engine
        .record_expression_dependencies(&rule, &expr, &scope, DependencyType::Normal)
        .unwrap();
    fx.catalog.publish_pending_changes().unwrap();

    // rule -> (table col 1), rule -> operator 55, rule -> type 23
    assert_eq!(fx.catalog.edge_count(), 3);

    let err = fx.engine.delete(&table, DropBehavior::Restrict).unwrap_err();
    assert!(matches!(err, DependencyError::DependentObjectsExist { .. }));
}

#[test]
fn test_single_relation_recording_splits_behaviors() {
    let fx = Fixture::new();
    let table = fx.relation(10);
    let constraint = fx.object(ObjectKind::Constraint, 5);

    // CHECK (f(col1)): auto-dependent on its own column, normal on the
    // function it calls.
    let expr = Expression::FunctionCall {
        function_id: 88,
        args: vec![column(0, 0, 1)],
    };
    fx.engine
        .record_single_relation_dependencies(
            &constraint,
            &expr,
            10,
            DependencyType::Normal,
            DependencyType::Auto,
        )
        .unwrap();
    fx.catalog.publish_pending_changes().unwrap();
    assert_eq!(fx.catalog.edge_count(), 2);

    // The AUTO self-dependency lets a RESTRICT drop of the table take the
    // constraint with it silently.
    fx.engine.delete(&table, DropBehavior::Restrict).unwrap();
    assert!(!fx.catalog.contains_object(ObjectKind::Constraint, 5));
}

#[test]
fn test_single_relation_recording_with_uniform_behavior() {
    let fx = Fixture::new();
    let table = fx.relation(10);
    let rule = fx.object(ObjectKind::RewriteRule, 5);

    let expr = Expression::FunctionCall {
        function_id: 88,
        args: vec![column(0, 0, 1)],
    };
    fx.engine
        .record_single_relation_dependencies(
            &rule,
            &expr,
            10,
            DependencyType::Normal,
            DependencyType::Normal,
        )
        .unwrap();
    fx.catalog.publish_pending_changes().unwrap();

    // Same edge set as a split recording, all NORMAL: the self-reference now
    // blocks a RESTRICT drop of the table instead of cascading silently.
    assert_eq!(fx.catalog.edge_count(), 2);
    let err = fx.engine.delete(&table, DropBehavior::Restrict).unwrap_err();
    assert!(matches!(err, DependencyError::DependentObjectsExist { .. }));
}
