//! Compiler and codec invariant tests
//!
//! Tests must prove that invariants hold under all conditions.
//!
//! Test categories:
//! 1. Identifier codec round trips
//! 2. Blob codec round trips
//! 3. Negation rewriting (De Morgan)
//! 4. LIKE-family regex translation
//! 5. Comparison operand validation

use bson::spec::BinarySubtype;
use bson::{doc, Binary, Bson};

use mongodal::algebra::{Constant, Expr, Field, FieldType, Operator, Query};
use mongodal::codec::{self, blob, object_id, object_id_from_int, object_id_to_int};
use mongodal::compiler::{expand_query, CompileError, CompileMode};

fn field(name: &str, ftype: FieldType) -> Field {
    Field::new("things", name, ftype)
}

// =============================================================================
// IDENTIFIER ROUND TRIPS
// =============================================================================

/// Every integer identifier survives the trip through the stored form.
#[test]
fn test_integer_id_roundtrip() {
    for value in [0u128, 1, 42, u64::MAX as u128, (1u128 << 96) - 1] {
        let oid = object_id_from_int(value);
        assert_eq!(object_id_to_int(&oid), value);
    }
}

/// Hex and decimal strings resolve to the same identifier space.
#[test]
fn test_string_id_parsing() {
    let decimal = object_id(&Constant::Str("123".into())).unwrap();
    assert_eq!(object_id_to_int(&decimal), 123);

    let hex = object_id(&Constant::Str("0x7b".into())).unwrap();
    assert_eq!(object_id_to_int(&hex), 0x7b);

    let raw = object_id(&Constant::Str("000000000000000000000010".into())).unwrap();
    assert_eq!(object_id_to_int(&raw), 0x10);
}

#[test]
fn test_malformed_id_strings_rejected() {
    assert!(object_id(&Constant::Str("not an id!".into())).is_err());
    assert!(object_id(&Constant::Int(-1)).is_err());
}

// =============================================================================
// BLOB ROUND TRIPS
// =============================================================================

/// Arbitrary bytes keep their representation class through storage.
#[test]
fn test_blob_bytes_roundtrip() {
    let payloads: [&[u8]; 3] = [b"", b"\x00\x01\x02", b"\xff\xfe\xfd"];
    for payload in payloads {
        let original = Constant::Bytes(payload.to_vec());
        assert_eq!(blob::decode(&blob::encode(&original)), original);
    }
}

/// Text blobs stay plain strings, and foreign tagged text decodes.
#[test]
fn test_blob_text_forms() {
    let original = Constant::Str("stored text".into());
    assert_eq!(blob::decode(&blob::encode(&original)), original);

    let tagged = Bson::Binary(Binary {
        subtype: BinarySubtype::UserDefined(blob::BLOB_NON_UTF8_STR),
        bytes: b"from another client".to_vec(),
    });
    assert_eq!(
        blob::decode(&tagged),
        Constant::Str("from another client".into())
    );
}

// =============================================================================
// NEGATION REWRITING
// =============================================================================

/// NOT over a conjunction compiles to the disjunction of negations,
/// structurally equal document for document.
#[test]
fn test_de_morgan_conjunction() {
    let size = field("size", FieldType::Integer);
    let color = field("color", FieldType::String);

    let negated = size.eq(3i64).and(color.eq("red")).negate();
    let rewritten = Query(Expr::binary(
        Operator::Or,
        Expr::unary(Operator::Not, size.eq(3i64).0),
        Some(Expr::unary(Operator::Not, color.eq("red").0)),
    ));

    assert_eq!(
        expand_query(&negated, CompileMode::Filter).unwrap(),
        expand_query(&rewritten, CompileMode::Filter).unwrap()
    );
}

#[test]
fn test_de_morgan_disjunction() {
    let size = field("size", FieldType::Integer);

    let negated = size.lt(1i64).or(size.gt(9i64)).negate();
    let rewritten = Query(Expr::binary(
        Operator::And,
        Expr::unary(Operator::Not, size.lt(1i64).0),
        Some(Expr::unary(Operator::Not, size.gt(9i64).0)),
    ));

    assert_eq!(
        expand_query(&negated, CompileMode::Filter).unwrap(),
        expand_query(&rewritten, CompileMode::Filter).unwrap()
    );
}

/// Negating an equality collapses to an inequality, no `$not` wrapper.
#[test]
fn test_negated_equality_collapses() {
    let size = field("size", FieldType::Integer);
    let out = expand_query(&size.eq(3i64).negate(), CompileMode::Filter).unwrap();
    assert_eq!(out, doc! { "size": { "$ne": 3i64 } });
}

// =============================================================================
// LIKE TRANSLATION
// =============================================================================

/// `a%b_c` anchors both ends, `%` spans, `_` matches one character.
#[test]
fn test_like_wildcard_translation() {
    let name = field("name", FieldType::String);
    let out = expand_query(&name.like("a%b_c"), CompileMode::Filter).unwrap();
    assert_eq!(out, doc! { "name": { "$regex": "^a.*b.c$" } });
}

/// Regex metacharacters in the pattern are matched literally.
#[test]
fn test_like_escapes_metacharacters() {
    let name = field("name", FieldType::String);
    let out = expand_query(&name.like("10% (approx)"), CompileMode::Filter).unwrap();
    assert_eq!(out, doc! { "name": { "$regex": r"^10.* \(approx\)$" } });
}

#[test]
fn test_ilike_sets_insensitive_option() {
    let name = field("name", FieldType::String);
    let out = expand_query(&name.ilike("a%"), CompileMode::Filter).unwrap();
    assert_eq!(out, doc! { "name": { "$regex": "^a.*$", "$options": "i" } });
}

#[test]
fn test_anchored_matches() {
    let name = field("name", FieldType::String);
    assert_eq!(
        expand_query(&name.startswith("ab"), CompileMode::Filter).unwrap(),
        doc! { "name": { "$regex": "^ab" } }
    );
    assert_eq!(
        expand_query(&name.endswith("yz"), CompileMode::Filter).unwrap(),
        doc! { "name": { "$regex": "yz$" } }
    );
}

// =============================================================================
// COMPARISON VALIDATION
// =============================================================================

/// Ordered comparison against an absent value is a compile error, never
/// a silent null comparison.
#[test]
fn test_ordered_comparison_rejects_null() {
    let size = field("size", FieldType::Integer);
    let q = Query(Expr::binary(
        Operator::Gt,
        size.expr(),
        Some(Expr::Value(Constant::Null)),
    ));
    assert_eq!(
        expand_query(&q, CompileMode::Filter).unwrap_err(),
        CompileError::MissingOperand("GT")
    );
}

/// Equality against null stays legal: it matches absent fields.
#[test]
fn test_equality_against_null_allowed() {
    let size = field("size", FieldType::Integer);
    let out = expand_query(
        &Query(Expr::binary(
            Operator::Eq,
            size.expr(),
            Some(Expr::Value(Constant::Null)),
        )),
        CompileMode::Filter,
    )
    .unwrap();
    assert_eq!(out, doc! { "size": Bson::Null });
}

/// Reference comparisons coerce through the identifier codec.
#[test]
fn test_reference_comparison_coercion() {
    let owner = field("owner", FieldType::Reference("users".into()));
    let out = expand_query(&owner.eq(7i64), CompileMode::Filter).unwrap();
    assert_eq!(out, doc! { "owner": object_id_from_int(7) });

    let out = expand_query(&owner.eq("0x1c"), CompileMode::Filter).unwrap();
    assert_eq!(out, doc! { "owner": object_id_from_int(0x1c) });
}

/// Typed parse maps stored identifiers back into the algebra space.
#[test]
fn test_parse_recovers_identifier() {
    let stored = Bson::ObjectId(object_id_from_int(99));
    assert_eq!(
        codec::parse(&stored, &FieldType::Id),
        Constant::Id(99)
    );
}
