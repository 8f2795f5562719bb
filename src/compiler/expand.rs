//! Recursive expression expansion
//!
//! `expand` rewrites an algebra node into a native fragment:
//!
//! - field leaves compile to their stored name (`_id` for identifier
//!   fields; `$`-prefixed in aggregation-pipeline context)
//! - operator nodes dispatch through the operator table
//! - literal leaves coerce under the left-hand field's declared type,
//!   which routes id- and reference-typed comparisons through the
//!   identifier codec
//! - raw fragments pass through verbatim
//!
//! Compilation mode is a plain parameter threaded through every call;
//! nothing here mutates shared state, so concurrent sessions can compile
//! with different modes safely.

use bson::{Bson, Document};

use crate::algebra::{Expr, Field, FieldType, Query};
use crate::codec;

use super::errors::{CompileError, CompileResult};
use super::operators;

/// Rendering context for field references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompileMode {
    /// Plain filter documents
    #[default]
    Filter,
    /// Aggregation-pipeline projections (`$field` variable references)
    Aggregate,
}

/// Compiles one algebra node into a native fragment
pub fn expand(expr: &Expr, ftype: Option<&FieldType>, mode: CompileMode) -> CompileResult<Bson> {
    match expr {
        Expr::Field(field) => Ok(Bson::String(field_name(field, mode))),
        Expr::Op {
            op,
            first,
            second,
            opts,
        } => operators::compile_op(*op, first, second.as_deref(), opts, mode),
        Expr::Raw(fragment) => Ok(Bson::String(fragment.clone())),
        Expr::Value(constant) => match ftype {
            Some(ftype) => Ok(codec::represent(constant, ftype)?),
            None => Ok(codec::to_bson(constant)),
        },
    }
}

/// Expands an optional operand; absence compiles to null
pub(super) fn expand_opt(
    expr: Option<&Expr>,
    ftype: Option<&FieldType>,
    mode: CompileMode,
) -> CompileResult<Bson> {
    match expr {
        Some(expr) => expand(expr, ftype, mode),
        None => Ok(Bson::Null),
    }
}

/// The stored key a field compiles to
pub fn field_name(field: &Field, mode: CompileMode) -> String {
    if field.ftype.is_id() {
        "_id".to_string()
    } else if mode == CompileMode::Aggregate {
        format!("${}", field.name)
    } else {
        field.name.clone()
    }
}

/// Compiles a query tree into a filter document
pub fn expand_query(query: &Query, mode: CompileMode) -> CompileResult<Document> {
    match expand(&query.0, None, mode)? {
        Bson::Document(doc) => Ok(doc),
        other => Err(CompileError::InvalidQuery(format!(
            "filter compiled to a non-document fragment: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{Constant, Operator};
    use crate::codec::object_id_from_int;
    use bson::doc;

    fn field(name: &str, ftype: FieldType) -> Field {
        Field::new("things", name, ftype)
    }

    #[test]
    fn test_simple_equality() {
        let f = field("name", FieldType::String);
        let out = expand_query(&f.eq("widget"), CompileMode::Filter).unwrap();
        assert_eq!(out, doc! { "name": "widget" });
    }

    #[test]
    fn test_id_field_compiles_to_reserved_key() {
        let f = field("id", FieldType::Id);
        let out = expand_query(&f.eq(5i64), CompileMode::Filter).unwrap();
        assert_eq!(
            out,
            doc! { "_id": object_id_from_int(5) }
        );
    }

    #[test]
    fn test_reference_rhs_coerced_to_object_id() {
        let f = field("owner", FieldType::Reference("users".into()));
        let out = expand_query(&f.eq(9i64), CompileMode::Filter).unwrap();
        assert_eq!(out, doc! { "owner": object_id_from_int(9) });
    }

    #[test]
    fn test_belongs_coerces_each_member() {
        let f = field("owner", FieldType::Reference("users".into()));
        let out = expand_query(
            &f.belongs(vec![Constant::Int(1), Constant::Int(2)]),
            CompileMode::Filter,
        )
        .unwrap();
        assert_eq!(
            out,
            doc! { "owner": { "$in": [object_id_from_int(1), object_id_from_int(2)] } }
        );
    }

    #[test]
    fn test_belongs_rejects_serialized_nested_query() {
        let f = field("owner", FieldType::Reference("users".into()));
        let q = Query(Expr::binary(
            Operator::Belongs,
            f.expr(),
            Some(Expr::value("SELECT id FROM users")),
        ));
        let err = expand_query(&q, CompileMode::Filter).unwrap_err();
        assert_eq!(err, CompileError::NestedQuery);
    }

    #[test]
    fn test_ordered_comparison_rejects_absent_operand() {
        let f = field("size", FieldType::Integer);
        let q = Query(Expr::binary(Operator::Gt, f.expr(), None));
        let err = expand_query(&q, CompileMode::Filter).unwrap_err();
        assert_eq!(err, CompileError::MissingOperand("GT"));

        let q = Query(Expr::binary(
            Operator::Gt,
            f.expr(),
            Some(Expr::Value(Constant::Null)),
        ));
        assert!(matches!(
            expand_query(&q, CompileMode::Filter),
            Err(CompileError::MissingOperand("GT"))
        ));
    }

    #[test]
    fn test_comparison_operators() {
        let f = field("size", FieldType::Integer);
        assert_eq!(
            expand_query(&f.lt(4i64), CompileMode::Filter).unwrap(),
            doc! { "size": { "$lt": 4i64 } }
        );
        assert_eq!(
            expand_query(&f.ge(4i64), CompileMode::Filter).unwrap(),
            doc! { "size": { "$gte": 4i64 } }
        );
        assert_eq!(
            expand_query(&f.ne(4i64), CompileMode::Filter).unwrap(),
            doc! { "size": { "$ne": 4i64 } }
        );
    }

    #[test]
    fn test_de_morgan_on_conjunction() {
        let f = field("size", FieldType::Integer);
        let not_and = f.eq(1i64).and(f.eq(2i64)).negate();
        let or_of_nots = Query(Expr::binary(
            Operator::Or,
            Expr::unary(Operator::Not, f.eq(1i64).0),
            Some(Expr::unary(Operator::Not, f.eq(2i64).0)),
        ));
        // NOT(a AND b) == OR(NOT a, NOT b), structurally
        assert_eq!(
            expand_query(&not_and, CompileMode::Filter).unwrap(),
            expand_query(&or_of_nots, CompileMode::Filter).unwrap()
        );
    }

    #[test]
    fn test_double_negation_collapses() {
        let f = field("size", FieldType::Integer);
        let double = f.eq(3i64).negate().negate();
        assert_eq!(
            expand_query(&double, CompileMode::Filter).unwrap(),
            expand_query(&f.eq(3i64), CompileMode::Filter).unwrap()
        );
    }

    #[test]
    fn test_not_wraps_operator_body() {
        let f = field("size", FieldType::Integer);
        let out = expand_query(&f.lt(4i64).negate(), CompileMode::Filter).unwrap();
        assert_eq!(out, doc! { "size": { "$not": { "$lt": 4i64 } } });
    }

    #[test]
    fn test_not_on_plain_equality() {
        let f = field("size", FieldType::Integer);
        let out = expand_query(&f.eq(4i64).negate(), CompileMode::Filter).unwrap();
        assert_eq!(out, doc! { "size": { "$ne": 4i64 } });
    }

    #[test]
    fn test_aggregate_mode_prefixes_field_references() {
        let f = field("amount", FieldType::Integer);
        let out = expand(&f.sum(), None, CompileMode::Filter).unwrap();
        assert_eq!(out, Bson::Document(doc! { "$sum": "$amount" }));
    }

    #[test]
    fn test_id_rewrite_wins_over_aggregate_prefix() {
        let f = field("id", FieldType::Id);
        let out = expand(&f.expr(), None, CompileMode::Aggregate).unwrap();
        assert_eq!(out, Bson::String("_id".into()));
    }

    #[test]
    fn test_add_switches_to_concat_for_textual_fields() {
        let name = field("name", FieldType::String);
        let out = expand(
            &name.expr().add(Expr::value(" jr")),
            None,
            CompileMode::Aggregate,
        )
        .unwrap();
        assert_eq!(out, Bson::Document(doc! { "$concat": ["$name", " jr"] }));

        let size = field("size", FieldType::Integer);
        let out = expand(
            &size.expr().add(Expr::value(1i64)),
            None,
            CompileMode::Aggregate,
        )
        .unwrap();
        assert_eq!(out, Bson::Document(doc! { "$add": ["$size", 1i64] }));
    }

    #[test]
    fn test_count_distinct_unsupported() {
        let f = field("size", FieldType::Integer);
        let err = expand(&f.count(true), None, CompileMode::Filter).unwrap_err();
        assert_eq!(err, CompileError::CountDistinct);
        assert_eq!(
            expand(&f.count(false), None, CompileMode::Filter).unwrap(),
            Bson::Document(doc! { "$sum": 1 })
        );
    }

    #[test]
    fn test_alias_and_join_rejected() {
        let f = field("size", FieldType::Integer);
        let alias = Expr::binary(Operator::As, f.expr(), Some(Expr::value("s")));
        assert_eq!(
            expand(&alias, None, CompileMode::Filter).unwrap_err(),
            CompileError::AliasUnsupported
        );
        let join = Expr::binary(Operator::On, f.expr(), Some(f.expr()));
        assert_eq!(
            expand(&join, None, CompileMode::Filter).unwrap_err(),
            CompileError::JoinUnsupported
        );
    }

    #[test]
    fn test_orderby_rendering() {
        let a = field("alpha", FieldType::String);
        let b = field("beta", FieldType::Integer);
        let out = expand(&a.expr().comma(b.invert()), None, CompileMode::Filter).unwrap();
        assert_eq!(out, Bson::String("alpha, -beta".into()));
    }

    #[test]
    fn test_contains_variants() {
        let tags = field("tags", FieldType::ListString);
        let name = field("name", FieldType::String);

        // list field against another field: scripted containment
        let out = expand_query(&tags.contains(name.expr(), true), CompileMode::Filter).unwrap();
        assert_eq!(
            out,
            doc! { "$where": "this.tags.indexOf(this.name) > -1" }
        );

        // list field against a literal: whole-string element match
        let out = expand_query(&tags.contains(Expr::value("red"), true), CompileMode::Filter)
            .unwrap();
        assert_eq!(out, doc! { "tags": { "$regex": "^red$" } });

        // plain field, case-insensitive: unanchored substring regex
        let out = expand_query(&name.contains(Expr::value("red"), false), CompileMode::Filter)
            .unwrap();
        assert_eq!(
            out,
            doc! { "name": { "$regex": "red", "$options": "i" } }
        );
    }

    #[test]
    fn test_raw_fragment_passthrough() {
        let out = expand(&Expr::Raw("custom".into()), None, CompileMode::Filter).unwrap();
        assert_eq!(out, Bson::String("custom".into()));
    }
}
