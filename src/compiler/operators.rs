//! Operator-to-fragment table
//!
//! Every algebra operator maps to a pure function producing a native
//! filter/update fragment. Dispatch is an exhaustive match over the
//! operator enum, so adding an operator without a compilation rule is a
//! compile-time error.

use bson::{doc, Bson, Document};

use crate::algebra::{Constant, Expr, FieldType, OpOptions, Operator};
use crate::codec;

use super::errors::{CompileError, CompileResult};
use super::expand::{expand, expand_opt, CompileMode};
use super::like::{build_like_regex, LikeFlags};

fn one(key: impl Into<String>, value: impl Into<Bson>) -> Document {
    let mut doc = Document::new();
    doc.insert(key, value);
    doc
}

/// The compiled name of the left-hand operand, used as a document key
fn field_key(first: &Expr, mode: CompileMode) -> CompileResult<String> {
    match expand(first, None, mode)? {
        Bson::String(s) => Ok(s),
        other => Err(CompileError::InvalidQuery(format!(
            "expected a field operand, found {}",
            other
        ))),
    }
}

fn require_second<'a>(
    op: Operator,
    second: Option<&'a Expr>,
) -> CompileResult<&'a Expr> {
    second.ok_or_else(|| {
        CompileError::InvalidQuery(format!("{} requires two operands", op.name()))
    })
}

/// Compiles one operator node
pub(super) fn compile_op(
    op: Operator,
    first: &Expr,
    second: Option<&Expr>,
    opts: &OpOptions,
    mode: CompileMode,
) -> CompileResult<Bson> {
    match op {
        Operator::And => boolean("$and", op, first, second, mode),
        Operator::Or => boolean("$or", op, first, second, mode),
        Operator::Not => not(first, mode).map(Bson::Document),
        Operator::Invert => invert(first, mode),
        Operator::Eq => equality(first, second, mode),
        Operator::Ne => wrapped_comparison("$ne", first, second, mode),
        Operator::Lt => ordered_comparison("$lt", op, first, second, mode),
        Operator::Le => ordered_comparison("$lte", op, first, second, mode),
        Operator::Gt => ordered_comparison("$gt", op, first, second, mode),
        Operator::Ge => ordered_comparison("$gte", op, first, second, mode),
        Operator::Belongs => belongs(first, second, mode),
        Operator::Add => add(first, require_second(op, second)?, mode),
        Operator::Sub => arithmetic("$subtract", op, first, second, mode),
        Operator::Mul => arithmetic("$multiply", op, first, second, mode),
        Operator::Div => arithmetic("$divide", op, first, second, mode),
        Operator::Mod => arithmetic("$mod", op, first, second, mode),
        Operator::Sum => aggregate("$sum", first),
        Operator::Max => aggregate("$max", first),
        Operator::Min => aggregate("$min", first),
        Operator::Avg => aggregate("$avg", first),
        Operator::Count => count(opts),
        Operator::Like => like(first, require_second(op, second)?, opts.case_sensitive, mode),
        Operator::Ilike => like(first, require_second(op, second)?, false, mode),
        Operator::StartsWith => anchored(
            first,
            require_second(op, second)?,
            LikeFlags {
                starts_with: true,
                ..LikeFlags::default()
            },
            mode,
        ),
        Operator::EndsWith => anchored(
            first,
            require_second(op, second)?,
            LikeFlags {
                ends_with: true,
                ..LikeFlags::default()
            },
            mode,
        ),
        Operator::Contains => contains(first, require_second(op, second)?, opts, mode),
        Operator::Comma => comma(op, first, second, mode),
        Operator::As => Err(CompileError::AliasUnsupported),
        Operator::On => Err(CompileError::JoinUnsupported),
    }
}

fn boolean(
    key: &str,
    op: Operator,
    first: &Expr,
    second: Option<&Expr>,
    mode: CompileMode,
) -> CompileResult<Bson> {
    let second = require_second(op, second)?;
    let branches = vec![expand(first, None, mode)?, expand(second, None, mode)?];
    Ok(Bson::Document(one(key, branches)))
}

/// NOT with the De Morgan rewrite.
///
/// A negated conjunction/disjunction distributes over its branches with
/// the marker flipped; a negated `$ne` collapses back to equality; any
/// other operator body is wrapped in `$not`; a bare scalar becomes `$ne`.
pub(super) fn not(first: &Expr, mode: CompileMode) -> CompileResult<Document> {
    if let Expr::Op {
        op: inner @ (Operator::And | Operator::Or),
        first: a,
        second: Some(b),
        ..
    } = first
    {
        let flipped = if *inner == Operator::Or { "$and" } else { "$or" };
        let branches = vec![
            Bson::Document(not(a, mode)?),
            Bson::Document(not(b, mode)?),
        ];
        return Ok(one(flipped, branches));
    }

    let compiled = match expand(first, None, mode)? {
        Bson::Document(d) => d,
        other => {
            return Err(CompileError::InvalidQuery(format!(
                "NOT requires a filter operand, found {}",
                other
            )))
        }
    };
    let (key, body) = match compiled.into_iter().next() {
        Some(entry) => entry,
        None => {
            return Err(CompileError::InvalidQuery(
                "NOT applied to an empty filter".into(),
            ))
        }
    };

    let negated = match body {
        Bson::Document(inner) => {
            if inner.len() == 1 {
                if let Some(value) = inner.get("$ne") {
                    // double negation collapses to plain equality
                    value.clone()
                } else {
                    Bson::Document(one("$not", inner))
                }
            } else {
                Bson::Document(one("$not", inner))
            }
        }
        scalar => Bson::Document(one("$ne", scalar)),
    };
    Ok(one(key, negated))
}

fn invert(first: &Expr, mode: CompileMode) -> CompileResult<Bson> {
    match expand(first, None, mode)? {
        Bson::String(s) => Ok(Bson::String(format!("-{}", s))),
        other => Err(CompileError::InvalidQuery(format!(
            "INVERT requires a field operand, found {}",
            other
        ))),
    }
}

fn equality(first: &Expr, second: Option<&Expr>, mode: CompileMode) -> CompileResult<Bson> {
    let key = field_key(first, mode)?;
    let value = expand_opt(second, first.field_type(), mode)?;
    Ok(Bson::Document(one(key, value)))
}

fn wrapped_comparison(
    op_key: &str,
    first: &Expr,
    second: Option<&Expr>,
    mode: CompileMode,
) -> CompileResult<Bson> {
    let key = field_key(first, mode)?;
    let value = expand_opt(second, first.field_type(), mode)?;
    Ok(Bson::Document(one(key, one(op_key, value))))
}

fn ordered_comparison(
    op_key: &str,
    op: Operator,
    first: &Expr,
    second: Option<&Expr>,
    mode: CompileMode,
) -> CompileResult<Bson> {
    // comparing against absent is invalid, not a null comparison
    match second {
        None | Some(Expr::Value(Constant::Null)) => {
            return Err(CompileError::MissingOperand(op.name()))
        }
        Some(_) => {}
    }
    wrapped_comparison(op_key, first, second, mode)
}

fn belongs(first: &Expr, second: Option<&Expr>, mode: CompileMode) -> CompileResult<Bson> {
    let second = require_second(Operator::Belongs, second)?;
    let items = match second {
        // a string here means a pre-serialized nested query
        Expr::Value(Constant::Str(_)) => return Err(CompileError::NestedQuery),
        Expr::Value(Constant::List(items)) => items,
        _ => {
            return Err(CompileError::InvalidQuery(
                "BELONGS requires a list of values".into(),
            ))
        }
    };
    let mut coerced = Vec::with_capacity(items.len());
    for item in items {
        coerced.push(match first.field_type() {
            Some(ftype) => codec::represent(item, ftype)?,
            None => codec::to_bson(item),
        });
    }
    Ok(Bson::Document(one(
        field_key(first, mode)?,
        one("$in", coerced),
    )))
}

fn add(first: &Expr, second: &Expr, mode: CompileMode) -> CompileResult<Bson> {
    let textual = [first, second]
        .iter()
        .any(|e| e.field_type().map_or(false, FieldType::is_textual));
    let op_key = if textual { "$concat" } else { "$add" };
    let operands = vec![
        expand(first, None, mode)?,
        expand(second, first.field_type(), mode)?,
    ];
    Ok(Bson::Document(one(op_key, operands)))
}

fn arithmetic(
    op_key: &str,
    op: Operator,
    first: &Expr,
    second: Option<&Expr>,
    mode: CompileMode,
) -> CompileResult<Bson> {
    let second = require_second(op, second)?;
    let operands = vec![
        expand(first, None, mode)?,
        expand(second, first.field_type(), mode)?,
    ];
    Ok(Bson::Document(one(op_key, operands)))
}

fn aggregate(op_key: &str, first: &Expr) -> CompileResult<Bson> {
    // aggregate operands always render as pipeline variable references
    let operand = expand(first, None, CompileMode::Aggregate)?;
    Ok(Bson::Document(one(op_key, operand)))
}

fn count(opts: &OpOptions) -> CompileResult<Bson> {
    if opts.distinct {
        return Err(CompileError::CountDistinct);
    }
    Ok(Bson::Document(doc! { "$sum": 1 }))
}

fn like(
    first: &Expr,
    second: &Expr,
    case_sensitive: bool,
    mode: CompileMode,
) -> CompileResult<Bson> {
    let fragment = build_like_regex(
        second,
        LikeFlags {
            case_sensitive,
            like_wildcards: true,
            ..LikeFlags::default()
        },
        mode,
    )?;
    Ok(Bson::Document(one(field_key(first, mode)?, fragment)))
}

fn anchored(
    first: &Expr,
    second: &Expr,
    flags: LikeFlags,
    mode: CompileMode,
) -> CompileResult<Bson> {
    let fragment = build_like_regex(second, flags, mode)?;
    Ok(Bson::Document(one(field_key(first, mode)?, fragment)))
}

fn contains(
    first: &Expr,
    second: &Expr,
    opts: &OpOptions,
    mode: CompileMode,
) -> CompileResult<Bson> {
    // string-list field against another field needs a server-side script
    if let (Expr::Field(list_field), Expr::Field(needle_field)) = (first, second) {
        if list_field.ftype == FieldType::ListString && needle_field.ftype == FieldType::String {
            let script = format!(
                "this.{}.indexOf(this.{}) > -1",
                list_field.name, needle_field.name
            );
            return Ok(Bson::Document(one("$where", script)));
        }
    }

    let value = if let Expr::Value(id @ Constant::Id(_)) = second {
        Bson::ObjectId(codec::object_id(id)?)
    } else if first
        .field_type()
        .map_or(false, |t| *t == FieldType::ListString)
    {
        // list elements match whole-string
        build_like_regex(
            second,
            LikeFlags {
                case_sensitive: opts.case_sensitive,
                whole_string: true,
                ..LikeFlags::default()
            },
            mode,
        )?
    } else {
        build_like_regex(
            second,
            LikeFlags {
                case_sensitive: opts.case_sensitive,
                whole_string: false,
                ..LikeFlags::default()
            },
            mode,
        )?
    };
    Ok(Bson::Document(one(field_key(first, mode)?, value)))
}

fn comma(
    op: Operator,
    first: &Expr,
    second: Option<&Expr>,
    mode: CompileMode,
) -> CompileResult<Bson> {
    let second = require_second(op, second)?;
    let left = expand(first, None, mode)?;
    let right = expand(second, None, mode)?;
    match (left, right) {
        (Bson::String(a), Bson::String(b)) => Ok(Bson::String(format!("{}, {}", a, b))),
        _ => Err(CompileError::InvalidQuery(
            "COMMA requires field operands".into(),
        )),
    }
}
