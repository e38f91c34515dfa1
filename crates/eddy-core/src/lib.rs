//! Typed relational query model and SQL compiler.
//!
//! Queries are immutable values built from tables, typed columns,
//! predicates and joins, then compiled by a [`Dialect`] into statement
//! text plus an ordered parameter list. Construction and compilation are
//! pure and synchronous; execution lives in `eddy-db`.
//!
//! ```
//! use eddy_core::{Query, SqliteDialect, Dialect};
//!
//! let person = Query::table("person");
//! let id = person.col("id").bind::<i64>();
//! let query = person.filter(id.eq(5)).take(10);
//!
//! let sql = SqliteDialect::new().compile_select(&query).unwrap();
//! assert_eq!(
//!     sql.text,
//!     r#"SELECT a.* FROM "person" as a WHERE (a."id" IS ?) LIMIT 10"#
//! );
//! ```

pub mod dialect;
pub mod error;
pub mod expr;
pub mod join;
pub mod predicate;
pub mod query;
pub mod sql;
pub mod table;
pub mod typed;
pub mod value;

pub use dialect::{Dialect, SqliteDialect};
pub use error::CompileError;
pub use expr::{Expr, FunctionName};
pub use join::{Dataset, Join, JoinCondition, JoinDirection, JoinKind};
pub use predicate::{BinaryOp, Predicate};
pub use query::{Limit, Query};
pub use sql::Sql;
pub use table::{Column, Columns, Table};
pub use typed::{lit, Typed};
pub use value::{FromValue, Kind, Value, ValueError};

#[cfg(test)]
mod tests {
    use super::*;

    fn dialect() -> SqliteDialect {
        SqliteDialect::new()
    }

    fn placeholders(sql: &Sql) -> usize {
        sql.text.matches('?').count()
    }

    #[test]
    fn select_explicit_columns() {
        let query = Query::table("person").select(["id", "firstname"]);
        let sql = dialect().compile_select(&query).unwrap();

        assert_eq!(
            sql.text,
            r#"SELECT a."id", a."firstname" FROM "person" as a"#
        );
        assert!(sql.params.is_empty());
    }

    #[test]
    fn select_with_filter_parameterizes_the_literal() {
        let person = Query::table("person");
        let id = person.col("id").bind::<i64>();
        let query = person.filter(id.eq(5));

        let sql = dialect().compile_select(&query).unwrap();
        assert_eq!(
            sql.text,
            r#"SELECT a.* FROM "person" as a WHERE (a."id" IS ?)"#
        );
        assert_eq!(sql.params, vec![Value::Integer(5)]);
    }

    #[test]
    fn inner_join_aliases_both_sides_distinctly() {
        let person = Query::table("person");
        let comment = Query::table("comment");
        let on = person
            .col("id")
            .bind::<i64>()
            .eq_col(&comment.col("person_id").bind());

        let query = Query::from(person).zip_inner(comment, JoinCondition::On(on));
        let sql = dialect().compile_select(&query).unwrap();

        assert_eq!(
            sql.text,
            r#"SELECT b.*, a.* FROM "person" as b INNER JOIN "comment" as a ON (b."id" IS a."person_id")"#
        );
        assert!(sql.params.is_empty());
    }

    #[test]
    fn multi_row_insert_orders_parameters_row_major() {
        let comment = Table::with_columns("comment", ["person_id", "text"]);
        let rows = vec![
            vec![Value::Integer(5), Value::Text("a".into())],
            vec![Value::Integer(5), Value::Text("b".into())],
        ];

        let sql = dialect()
            .compile_insert(&comment, &Expr::Table(comment.clone()), &rows)
            .unwrap();

        assert_eq!(
            sql.text,
            r#"INSERT INTO "comment" ("person_id", "text") VALUES (?, ?), (?, ?)"#
        );
        assert_eq!(
            sql.params,
            vec![
                Value::Integer(5),
                Value::Text("a".into()),
                Value::Integer(5),
                Value::Text("b".into()),
            ]
        );
    }

    #[test]
    fn take_with_drop_renders_limit_offset() {
        let query = Query::from(Query::table("person")).take_drop(2, 1);
        let sql = dialect().compile_select(&query).unwrap();
        assert!(sql.text.ends_with("LIMIT 2 OFFSET 1"));
    }

    #[test]
    fn take_replaces_a_prior_limit() {
        let query = Query::from(Query::table("person")).take(10).take_drop(2, 1);
        assert_eq!(
            query.limit(),
            Some(Limit::OffsetRows { offset: 1, rows: 2 })
        );
    }

    #[test]
    fn compilation_is_idempotent() {
        let person = Query::table("person");
        let comment = Query::table("comment");
        let on = person
            .col("id")
            .bind::<i64>()
            .eq_col(&comment.col("person_id").bind());
        let query = Query::from(person.clone())
            .zip_inner(comment, JoinCondition::On(on))
            .filter(|_| person.col("firstname").bind::<String>().like("J%"))
            .take(3);

        let first = dialect().compile_select(&query).unwrap();
        let second = dialect().compile_select(&query).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn alias_assignment_reverses_declaration_order() {
        let a = Query::table("first");
        let b = Query::table("second");
        let c = Query::table("third");
        let query = Query::from(a).zip(b).zip(c);

        let sql = dialect().compile_select(&query).unwrap();
        assert_eq!(
            sql.text,
            r#"SELECT c.*, b.*, a.* FROM "first" as c CROSS JOIN "second" as b CROSS JOIN "third" as a"#
        );
    }

    #[test]
    fn aliases_stay_unique_past_twenty_six_tables() {
        let mut query = Query::from(Query::table("t0"));
        for i in 1..28 {
            query = query.zip(Query::table(format!("t{i}")));
        }

        let sql = dialect().compile_select(&query).unwrap();
        // reversed order: the last declared table gets "a", the first
        // two wrap into two letters
        assert!(sql.text.ends_with(r#""t27" as a"#));
        assert!(sql.text.contains(r#""t1" as aa"#));
        assert!(sql.text.contains(r#""t0" as ab"#));

        let aliases: std::collections::HashSet<&str> = sql
            .text
            .split(" as ")
            .skip(1)
            .filter_map(|rest| rest.split(' ').next())
            .collect();
        assert_eq!(aliases.len(), 28);
    }

    #[test]
    fn placeholder_count_always_matches_parameter_count() {
        let person = Query::table("person");
        let id = person.col("id").bind::<i64>();
        let name = person.col("name").bind::<String>();
        let query = person.filter(id.gt(18).and(name.like("A%")));

        let sql = dialect().compile_select(&query).unwrap();
        assert_eq!(placeholders(&sql), sql.params.len());
        assert_eq!(sql.params.len(), 2);
    }

    #[test]
    fn bare_bool_predicate_becomes_an_integer_parameter() {
        let query = Query::from(Query::table("person")).filter(|_| Predicate::Bool(true));
        let sql = dialect().compile_select(&query).unwrap();
        assert_eq!(sql.text, r#"SELECT a.* FROM "person" as a WHERE ?"#);
        assert_eq!(sql.params, vec![Value::Integer(1)]);
    }

    #[test]
    fn filter_conjoins_and_never_drops_the_prior_predicate() {
        let person = Query::table("person");
        let id = person.col("id").bind::<i64>();
        let name = person.col("name").bind::<String>();

        let query = person.filter(id.eq(1)).filter(move |_| name.eq("Ada"));
        match query.predicate() {
            Predicate::Compound { op: BinaryOp::And, a, b } => {
                // the newest filter lands on the left
                assert!(matches!(
                    **a,
                    Predicate::Comparison { op: BinaryOp::Eq, .. }
                ));
                assert!(matches!(
                    **b,
                    Predicate::Comparison { op: BinaryOp::Eq, .. }
                ));
            }
            other => panic!("expected AND compound, got {other:?}"),
        }
    }

    #[test]
    fn map_replaces_only_the_projection() {
        let person = Query::table("person");
        let id = person.col("id").bind::<i64>();
        let query = person
            .filter(id.gt(0))
            .map(|_| Expr::Column(Query::table("person").col("firstname")));

        let sql = dialect().compile_select(&query).unwrap();
        assert_eq!(
            sql.text,
            r#"SELECT a."firstname" FROM "person" as a WHERE (a."id" > ?)"#
        );
    }

    #[test]
    fn using_and_natural_joins_render_their_clauses() {
        let person = Query::table("person");
        let comment = Query::table("comment");

        let using = Query::from(person.clone())
            .zip_inner(comment.clone(), JoinCondition::Using(vec!["id".into()]));
        let sql = dialect().compile_select(&using).unwrap();
        assert!(sql.text.contains(r#"INNER JOIN "comment" as a USING("id")"#));

        let outer_using = Query::from(person.clone()).zip_outer(
            comment.clone(),
            JoinDirection::Right,
            JoinCondition::Using(vec!["id".into()]),
        );
        let sql = dialect().compile_select(&outer_using).unwrap();
        assert!(sql
            .text
            .contains(r#"RIGHT OUTER JOIN "comment" as a USING("id")"#));

        let natural = Query::from(person).zip_inner(comment, JoinCondition::Natural);
        let sql = dialect().compile_select(&natural).unwrap();
        assert!(sql.text.contains(r#"NATURAL JOIN "comment" as a"#));
    }

    #[test]
    fn outer_join_renders_direction() {
        let person = Query::table("person");
        let comment = Query::table("comment");
        let query = Query::from(person).zip_outer(
            comment,
            JoinDirection::Left,
            JoinCondition::On(Predicate::Null),
        );

        let sql = dialect().compile_select(&query).unwrap();
        // a null ON predicate degrades to a parameterized true
        assert!(sql.text.contains(r#"LEFT OUTER JOIN "comment" as a ON ?"#));
        assert_eq!(sql.params, vec![Value::Integer(1)]);
    }

    #[test]
    fn string_functions_render_as_calls() {
        let person = Query::table("person");
        let name = person.col("name").bind::<String>();
        let query = person.filter(name.upper().eq("ADA"));

        let sql = dialect().compile_select(&query).unwrap();
        assert!(sql.text.contains(r#"(UPPER(a."name") IS ?)"#));
        assert_eq!(sql.params, vec![Value::Text("ADA".into())]);
    }

    #[test]
    fn update_renders_bare_assignments_and_reuses_the_predicate() {
        let comment = Table::with_columns("comment", ["person_id", "text"]);
        let predicate = comment.col("id").bind::<i64>().eq(7);

        let sql = dialect()
            .compile_update(
                &comment,
                &Expr::Table(comment.clone()),
                &[Value::Integer(5), Value::Text("hi".into())],
                &predicate,
            )
            .unwrap();

        assert_eq!(
            sql.text,
            r#"UPDATE "comment" SET "person_id" = ?, "text" = ? WHERE ("id" IS ?)"#
        );
        assert_eq!(
            sql.params,
            vec![
                Value::Integer(5),
                Value::Text("hi".into()),
                Value::Integer(7),
            ]
        );
    }

    #[test]
    fn delete_without_filter_omits_where() {
        let comment = Table::new("comment");
        let sql = dialect()
            .compile_delete(&comment, &Predicate::Null)
            .unwrap();
        assert_eq!(sql.text, r#"DELETE FROM "comment""#);

        let filtered = dialect()
            .compile_delete(&comment, &comment.col("id").bind::<i64>().eq(1))
            .unwrap();
        assert_eq!(
            filtered.text,
            r#"DELETE FROM "comment" WHERE ("id" IS ?)"#
        );
    }

    #[test]
    fn whole_table_insert_omits_the_column_list() {
        let comment = Table::new("comment");
        let sql = dialect()
            .compile_insert(
                &comment,
                &Expr::Table(comment.clone()),
                &[vec![Value::Integer(1), Value::Text("x".into())]],
            )
            .unwrap();
        assert_eq!(sql.text, r#"INSERT INTO "comment" VALUES (?, ?)"#);
    }

    #[test]
    fn unrenderable_shapes_are_errors_not_panics() {
        let comment = Table::new("comment");

        // empty insert
        let err = dialect()
            .compile_insert(&comment, &Expr::Table(comment.clone()), &[])
            .unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedExpression(_)));

        // update without explicit columns
        let err = dialect()
            .compile_update(
                &comment,
                &Expr::Table(comment.clone()),
                &[Value::Integer(1)],
                &Predicate::Null,
            )
            .unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedExpression(_)));

        // natural outer join
        let query = Query::from(Query::table("person")).zip_outer(
            comment,
            JoinDirection::Full,
            JoinCondition::Natural,
        );
        let err = dialect().compile_select(&query).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedExpression(_)));
    }

    #[test]
    fn compound_with_absent_side_parameterizes_null() {
        let query =
            Query::from(Query::table("person")).filter(|_| Predicate::Null.xor(Predicate::Null));
        let sql = dialect().compile_select(&query).unwrap();
        assert!(sql.text.contains("WHERE (? IS NOT ?)"));
        assert_eq!(sql.params, vec![Value::Null, Value::Null]);
    }

    #[test]
    fn stripe_flattens_nested_tuples_in_order() {
        let t = Table::new("t");
        let a = Expr::Column(t.col("a"));
        let b = Expr::Column(t.col("b"));
        let c = Expr::Column(t.col("c"));
        let nested = Expr::tuple([a.clone(), Expr::tuple([b.clone(), c.clone()])]);

        let stripe = nested.stripe();
        assert_eq!(stripe, vec![&a, &b, &c]);
        assert!(stripe
            .iter()
            .all(|leaf| !matches!(leaf, Expr::Tuple(_))));
    }
}
