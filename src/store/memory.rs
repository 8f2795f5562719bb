//! In-memory document store
//!
//! A reference `DocumentStore` that evaluates compiled filter documents,
//! `$set`/`$pull` updates, and `$match`/`$group`/`$project` pipelines
//! against plain vectors of documents. Matching follows store semantics:
//! equality against an array field matches any element, `$regex` honours
//! the `i` option, missing fields only match null.
//!
//! `$where` scripts are rejected: there is no script engine here.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use bson::oid::ObjectId;
use bson::{Bson, Document};
use regex::RegexBuilder;

use super::errors::{StoreError, StoreResult};
use super::interface::{DocumentStore, InsertOutcome, WriteOutcome};

/// Collections held as plain document vectors
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: BTreeMap<String, Vec<Document>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw view of a collection, for assertions
    pub fn collection(&self, name: &str) -> &[Document] {
        self.collections.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    fn matches(document: &Document, filter: &Document) -> StoreResult<bool> {
        for (key, condition) in filter {
            let matched = match key.as_str() {
                "$and" => Self::branch_match(document, condition, true)?,
                "$or" => Self::branch_match(document, condition, false)?,
                "$where" => {
                    return Err(StoreError::UnsupportedOperator("$where".into()));
                }
                field => Self::field_match(document.get(field), condition)?,
            };
            if !matched {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn branch_match(document: &Document, branches: &Bson, all: bool) -> StoreResult<bool> {
        let branches = match branches {
            Bson::Array(items) => items,
            other => {
                return Err(StoreError::MalformedDocument(format!(
                    "boolean operator expects an array, found {}",
                    other
                )))
            }
        };
        let mut any = false;
        for branch in branches {
            let sub = match branch {
                Bson::Document(doc) => Self::matches(document, doc)?,
                other => {
                    return Err(StoreError::MalformedDocument(format!(
                        "boolean branch must be a document, found {}",
                        other
                    )))
                }
            };
            if all && !sub {
                return Ok(false);
            }
            any = any || sub;
        }
        Ok(if all { true } else { any })
    }

    fn field_match(value: Option<&Bson>, condition: &Bson) -> StoreResult<bool> {
        if let Bson::Document(ops) = condition {
            if ops.keys().any(|k| k.starts_with('$')) {
                return Self::operator_match(value, ops);
            }
        }
        Ok(Self::eq_match(value, condition))
    }

    /// Equality with array-membership semantics
    fn eq_match(value: Option<&Bson>, expected: &Bson) -> bool {
        match value {
            None => matches!(expected, Bson::Null),
            Some(actual) if actual == expected => true,
            Some(Bson::Array(items)) => items.iter().any(|item| item == expected),
            Some(_) => false,
        }
    }

    fn operator_match(value: Option<&Bson>, ops: &Document) -> StoreResult<bool> {
        if ops.contains_key("$regex") {
            return Self::regex_match(value, ops);
        }
        for (op, arg) in ops {
            let matched = match op.as_str() {
                "$ne" => !Self::eq_match(value, arg),
                "$in" => match arg {
                    Bson::Array(items) => items.iter().any(|item| Self::eq_match(value, item)),
                    other => {
                        return Err(StoreError::MalformedDocument(format!(
                            "$in expects an array, found {}",
                            other
                        )))
                    }
                },
                "$lt" | "$lte" | "$gt" | "$gte" => match value {
                    Some(actual) => Self::ordered_match(op, actual, arg),
                    None => false,
                },
                "$not" => match arg {
                    Bson::Document(inner) => !Self::operator_match(value, inner)?,
                    other => !Self::eq_match(value, other),
                },
                other => {
                    return Err(StoreError::UnsupportedOperator(other.into()));
                }
            };
            if !matched {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn ordered_match(op: &str, actual: &Bson, bound: &Bson) -> bool {
        let Some(ord) = bson_cmp(actual, bound) else {
            return false;
        };
        match op {
            "$lt" => ord == Ordering::Less,
            "$lte" => ord != Ordering::Greater,
            "$gt" => ord == Ordering::Greater,
            "$gte" => ord != Ordering::Less,
            _ => false,
        }
    }

    fn regex_match(value: Option<&Bson>, ops: &Document) -> StoreResult<bool> {
        let pattern = ops
            .get_str("$regex")
            .map_err(|_| StoreError::MalformedDocument("$regex expects a string".into()))?;
        let insensitive = ops
            .get_str("$options")
            .map(|o| o.contains('i'))
            .unwrap_or(false);
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(insensitive)
            .build()
            .map_err(|e| StoreError::BadRegex(e.to_string()))?;
        Ok(match value {
            Some(Bson::String(s)) => regex.is_match(s),
            Some(Bson::Array(items)) => items.iter().any(|item| match item {
                Bson::String(s) => regex.is_match(s),
                _ => false,
            }),
            _ => false,
        })
    }

    fn apply_projection(document: &Document, projection: &Document) -> Document {
        let mut out = Document::new();
        if !id_suppressed(projection) {
            if let Some(id) = document.get("_id") {
                out.insert("_id", id.clone());
            }
        }
        for (key, flag) in projection {
            if key == "_id" || !truthy_flag(flag) {
                continue;
            }
            if let Some(value) = document.get(key) {
                out.insert(key.clone(), value.clone());
            }
        }
        out
    }

    fn run_group(input: &[Document], spec: &Document) -> StoreResult<Vec<Document>> {
        match spec.get("_id") {
            Some(Bson::Null) => {}
            other => {
                return Err(StoreError::UnsupportedOperator(format!(
                    "$group _id {:?}",
                    other
                )))
            }
        }
        if input.is_empty() {
            return Ok(Vec::new());
        }
        let mut out = Document::new();
        out.insert("_id", Bson::Null);
        for (key, accumulator) in spec {
            if key == "_id" {
                continue;
            }
            let (op, operand) = match accumulator {
                Bson::Document(d) if d.len() == 1 => match d.iter().next() {
                    Some((op, operand)) => (op.clone(), operand.clone()),
                    None => continue,
                },
                other => {
                    return Err(StoreError::MalformedDocument(format!(
                        "accumulator must be a single-operator document, found {}",
                        other
                    )))
                }
            };
            let mut values = Vec::with_capacity(input.len());
            for doc in input {
                values.push(eval_expr(doc, &operand)?);
            }
            let folded = match op.as_str() {
                "$sum" => numeric_fold(&values, 0.0, |acc, v| acc + v),
                "$avg" => {
                    let nums: Vec<f64> = values.iter().filter_map(as_f64).collect();
                    if nums.is_empty() {
                        Bson::Null
                    } else {
                        Bson::Double(nums.iter().sum::<f64>() / nums.len() as f64)
                    }
                }
                "$max" => extremum(&values, Ordering::Greater),
                "$min" => extremum(&values, Ordering::Less),
                "$first" => values.first().cloned().unwrap_or(Bson::Null),
                other => {
                    return Err(StoreError::UnsupportedOperator(other.into()));
                }
            };
            out.insert(key.clone(), folded);
        }
        Ok(vec![out])
    }

    fn run_project(input: &[Document], spec: &Document) -> StoreResult<Vec<Document>> {
        let mut out = Vec::with_capacity(input.len());
        for doc in input {
            let mut projected = Document::new();
            if !id_suppressed(spec) {
                if let Some(id) = doc.get("_id") {
                    projected.insert("_id", id.clone());
                }
            }
            for (key, value) in spec {
                if key == "_id" {
                    continue;
                }
                if truthy_flag(value) {
                    if let Some(v) = doc.get(key) {
                        projected.insert(key.clone(), v.clone());
                    }
                } else {
                    projected.insert(key.clone(), eval_expr(doc, value)?);
                }
            }
            out.push(projected);
        }
        Ok(out)
    }
}

fn id_suppressed(projection: &Document) -> bool {
    matches!(
        projection.get("_id"),
        Some(Bson::Null)
            | Some(Bson::Int32(0))
            | Some(Bson::Int64(0))
            | Some(Bson::Boolean(false))
    )
}

fn truthy_flag(flag: &Bson) -> bool {
    match flag {
        Bson::Int32(1) | Bson::Int64(1) | Bson::Boolean(true) => true,
        Bson::Double(f) => *f == 1.0,
        _ => false,
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(*n as f64),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(f) => Some(*f),
        _ => None,
    }
}

fn all_integers(values: &[Bson]) -> bool {
    values
        .iter()
        .all(|v| matches!(v, Bson::Int32(_) | Bson::Int64(_)))
}

fn numeric_fold(values: &[Bson], init: f64, fold: impl Fn(f64, f64) -> f64) -> Bson {
    let total = values
        .iter()
        .filter_map(as_f64)
        .fold(init, |acc, v| fold(acc, v));
    if all_integers(values) {
        Bson::Int64(total as i64)
    } else {
        Bson::Double(total)
    }
}

fn extremum(values: &[Bson], keep: Ordering) -> Bson {
    let mut best: Option<&Bson> = None;
    for value in values {
        if matches!(value, Bson::Null) {
            continue;
        }
        best = match best {
            None => Some(value),
            Some(current) => {
                if bson_cmp(value, current) == Some(keep) {
                    Some(value)
                } else {
                    Some(current)
                }
            }
        };
    }
    best.cloned().unwrap_or(Bson::Null)
}

/// Partial order over comparable value classes
fn bson_cmp(a: &Bson, b: &Bson) -> Option<Ordering> {
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => Some(x.bytes().cmp(&y.bytes())),
        (Bson::DateTime(x), Bson::DateTime(y)) => {
            Some(x.timestamp_millis().cmp(&y.timestamp_millis()))
        }
        _ => {
            let (x, y) = (as_f64(a)?, as_f64(b)?);
            x.partial_cmp(&y)
        }
    }
}

/// Pipeline-expression evaluation for `$project` and accumulators
fn eval_expr(document: &Document, expr: &Bson) -> StoreResult<Bson> {
    match expr {
        Bson::String(s) if s.starts_with('$') => {
            Ok(document.get(&s[1..]).cloned().unwrap_or(Bson::Null))
        }
        Bson::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(eval_expr(document, item)?);
            }
            Ok(Bson::Array(out))
        }
        Bson::Document(d) if d.len() == 1 => {
            let (op, arg) = match d.iter().next() {
                Some(entry) => entry,
                None => return Ok(Bson::Document(d.clone())),
            };
            match op.as_str() {
                "$literal" => Ok(arg.clone()),
                "$concat" => {
                    let operands = eval_operands(document, arg)?;
                    let mut joined = String::new();
                    for operand in &operands {
                        match operand {
                            Bson::String(s) => joined.push_str(s),
                            Bson::Null => return Ok(Bson::Null),
                            other => {
                                return Err(StoreError::MalformedDocument(format!(
                                    "$concat expects strings, found {}",
                                    other
                                )))
                            }
                        }
                    }
                    Ok(Bson::String(joined))
                }
                "$add" => {
                    let operands = eval_operands(document, arg)?;
                    Ok(numeric_fold(&operands, 0.0, |acc, v| acc + v))
                }
                "$multiply" => {
                    let operands = eval_operands(document, arg)?;
                    Ok(numeric_fold(&operands, 1.0, |acc, v| acc * v))
                }
                "$subtract" => binary_numeric(document, arg, |a, b| a - b),
                "$divide" => {
                    let (a, b) = binary_operands(document, arg)?;
                    if b == 0.0 {
                        Ok(Bson::Null)
                    } else {
                        Ok(Bson::Double(a / b))
                    }
                }
                "$mod" => binary_numeric(document, arg, |a, b| a % b),
                "$and" => {
                    let operands = eval_operands(document, arg)?;
                    Ok(Bson::Boolean(operands.iter().all(truthy_value)))
                }
                "$or" => {
                    let operands = eval_operands(document, arg)?;
                    Ok(Bson::Boolean(operands.iter().any(truthy_value)))
                }
                other => Err(StoreError::UnsupportedOperator(other.into())),
            }
        }
        other => Ok(other.clone()),
    }
}

fn truthy_value(value: &Bson) -> bool {
    !matches!(
        value,
        Bson::Null | Bson::Boolean(false) | Bson::Int32(0) | Bson::Int64(0)
    ) && as_f64(value).map_or(true, |f| f != 0.0)
}

fn eval_operands(document: &Document, arg: &Bson) -> StoreResult<Vec<Bson>> {
    match arg {
        Bson::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(eval_expr(document, item)?);
            }
            Ok(out)
        }
        single => Ok(vec![eval_expr(document, single)?]),
    }
}

fn binary_operands(document: &Document, arg: &Bson) -> StoreResult<(f64, f64)> {
    let operands = eval_operands(document, arg)?;
    match operands.as_slice() {
        [a, b] => match (as_f64(a), as_f64(b)) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(StoreError::MalformedDocument(
                "arithmetic on non-numeric operands".into(),
            )),
        },
        _ => Err(StoreError::MalformedDocument(
            "binary operator expects two operands".into(),
        )),
    }
}

fn binary_numeric(
    document: &Document,
    arg: &Bson,
    apply: impl Fn(f64, f64) -> f64,
) -> StoreResult<Bson> {
    let operands = eval_operands(document, arg)?;
    let result = {
        let (a, b) = match operands.as_slice() {
            [a, b] => match (as_f64(a), as_f64(b)) {
                (Some(a), Some(b)) => (a, b),
                _ => {
                    return Err(StoreError::MalformedDocument(
                        "arithmetic on non-numeric operands".into(),
                    ))
                }
            },
            _ => {
                return Err(StoreError::MalformedDocument(
                    "binary operator expects two operands".into(),
                ))
            }
        };
        apply(a, b)
    };
    if all_integers(&operands) {
        Ok(Bson::Int64(result as i64))
    } else {
        Ok(Bson::Double(result))
    }
}

impl DocumentStore for MemoryStore {
    fn count(&self, collection: &str, filter: Option<&Document>) -> StoreResult<u64> {
        let mut count = 0u64;
        for doc in self.collection(collection) {
            let matched = match filter {
                Some(f) => Self::matches(doc, f)?,
                None => true,
            };
            if matched {
                count += 1;
            }
        }
        Ok(count)
    }

    fn find(
        &self,
        collection: &str,
        filter: Option<&Document>,
        projection: Option<&Document>,
        skip: u64,
        limit: u64,
        sort: &[(String, i32)],
    ) -> StoreResult<Vec<Document>> {
        let mut matched = Vec::new();
        for doc in self.collection(collection) {
            let keep = match filter {
                Some(f) => Self::matches(doc, f)?,
                None => true,
            };
            if keep {
                matched.push(doc.clone());
            }
        }
        if !sort.is_empty() {
            matched.sort_by(|a, b| {
                for (key, direction) in sort {
                    let ord = match (a.get(key), b.get(key)) {
                        (Some(x), Some(y)) => bson_cmp(x, y).unwrap_or(Ordering::Equal),
                        (Some(_), None) => Ordering::Greater,
                        (None, Some(_)) => Ordering::Less,
                        (None, None) => Ordering::Equal,
                    };
                    let ord = if *direction < 0 { ord.reverse() } else { ord };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }
        let mut page: Vec<Document> = matched.into_iter().skip(skip as usize).collect();
        if limit > 0 {
            page.truncate(limit as usize);
        }
        if let Some(projection) = projection {
            if !projection.is_empty() {
                page = page
                    .iter()
                    .map(|doc| Self::apply_projection(doc, projection))
                    .collect();
            }
        }
        Ok(page)
    }

    fn aggregate(&self, collection: &str, pipeline: &[Document]) -> StoreResult<Vec<Document>> {
        let mut docs: Vec<Document> = self.collection(collection).to_vec();
        for stage in pipeline {
            let (op, spec) = match stage.iter().next() {
                Some((op, Bson::Document(spec))) if stage.len() == 1 => (op.as_str(), spec),
                _ => {
                    return Err(StoreError::MalformedDocument(
                        "pipeline stage must be a single-operator document".into(),
                    ))
                }
            };
            docs = match op {
                "$match" => {
                    let mut kept = Vec::new();
                    for doc in &docs {
                        if Self::matches(doc, spec)? {
                            kept.push(doc.clone());
                        }
                    }
                    kept
                }
                "$group" => Self::run_group(&docs, spec)?,
                "$project" => Self::run_project(&docs, spec)?,
                other => return Err(StoreError::UnsupportedOperator(other.into())),
            };
        }
        Ok(docs)
    }

    fn insert_one(
        &mut self,
        collection: &str,
        mut document: Document,
        acknowledged: bool,
    ) -> StoreResult<InsertOutcome> {
        let id = match document.get_object_id("_id") {
            Ok(id) => id,
            Err(_) => {
                let id = ObjectId::new();
                document.insert("_id", id);
                id
            }
        };
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(InsertOutcome {
            acknowledged,
            inserted_id: Some(id),
        })
    }

    fn update_many(
        &mut self,
        collection: &str,
        filter: &Document,
        update: &Document,
        acknowledged: bool,
    ) -> StoreResult<WriteOutcome> {
        let mut matched = 0u64;
        if let Some(docs) = self.collections.get_mut(collection) {
            for doc in docs.iter_mut() {
                if !Self::matches(doc, filter)? {
                    continue;
                }
                matched += 1;
                for (op, spec) in update {
                    let spec = match spec {
                        Bson::Document(spec) => spec,
                        other => {
                            return Err(StoreError::MalformedDocument(format!(
                                "update operator expects a document, found {}",
                                other
                            )))
                        }
                    };
                    match op.as_str() {
                        "$set" => {
                            for (key, value) in spec {
                                doc.insert(key.clone(), value.clone());
                            }
                        }
                        "$pull" => {
                            for (key, value) in spec {
                                if let Some(Bson::Array(items)) = doc.get_mut(key) {
                                    items.retain(|item| item != value);
                                }
                            }
                        }
                        other => {
                            return Err(StoreError::UnsupportedOperator(other.into()));
                        }
                    }
                }
            }
        }
        Ok(WriteOutcome {
            acknowledged,
            matched,
            deleted: 0,
        })
    }

    fn replace_one(
        &mut self,
        collection: &str,
        filter: &Document,
        mut replacement: Document,
        acknowledged: bool,
    ) -> StoreResult<WriteOutcome> {
        let mut matched = 0u64;
        if let Some(docs) = self.collections.get_mut(collection) {
            for doc in docs.iter_mut() {
                if Self::matches(doc, filter)? {
                    if !replacement.contains_key("_id") {
                        if let Some(id) = doc.get("_id") {
                            replacement.insert("_id", id.clone());
                        }
                    }
                    *doc = replacement;
                    matched = 1;
                    break;
                }
            }
        }
        Ok(WriteOutcome {
            acknowledged,
            matched,
            deleted: 0,
        })
    }

    fn delete_many(
        &mut self,
        collection: &str,
        filter: &Document,
        acknowledged: bool,
    ) -> StoreResult<WriteOutcome> {
        let mut deleted = 0u64;
        if let Some(docs) = self.collections.get_mut(collection) {
            let mut kept = Vec::with_capacity(docs.len());
            for doc in docs.drain(..) {
                if Self::matches(&doc, filter)? {
                    deleted += 1;
                } else {
                    kept.push(doc);
                }
            }
            *docs = kept;
        }
        Ok(WriteOutcome {
            acknowledged,
            matched: deleted,
            deleted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn seeded() -> MemoryStore {
        let mut store = MemoryStore::new();
        for doc in [
            doc! { "name": "ada", "age": 36i64, "tags": ["x", "y"] },
            doc! { "name": "grace", "age": 45i64, "tags": ["y"] },
            doc! { "name": "alan", "age": 41i64 },
        ] {
            store.insert_one("people", doc, true).unwrap();
        }
        store
    }

    #[test]
    fn test_equality_and_array_membership() {
        let store = seeded();
        assert_eq!(
            store.count("people", Some(&doc! { "name": "ada" })).unwrap(),
            1
        );
        // equality against an array field matches elements
        assert_eq!(
            store.count("people", Some(&doc! { "tags": "y" })).unwrap(),
            2
        );
    }

    #[test]
    fn test_operator_filters() {
        let store = seeded();
        assert_eq!(
            store
                .count("people", Some(&doc! { "age": { "$gte": 41i64 } }))
                .unwrap(),
            2
        );
        assert_eq!(
            store
                .count("people", Some(&doc! { "age": { "$not": { "$gte": 41i64 } } }))
                .unwrap(),
            1
        );
        assert_eq!(
            store
                .count(
                    "people",
                    Some(&doc! { "$or": [ { "name": "ada" }, { "name": "alan" } ] })
                )
                .unwrap(),
            2
        );
        assert_eq!(
            store
                .count("people", Some(&doc! { "name": { "$in": ["ada", "zoe"] } }))
                .unwrap(),
            1
        );
    }

    #[test]
    fn test_regex_filter_with_options() {
        let store = seeded();
        assert_eq!(
            store
                .count("people", Some(&doc! { "name": { "$regex": "^a" } }))
                .unwrap(),
            2
        );
        assert_eq!(
            store
                .count(
                    "people",
                    Some(&doc! { "name": { "$regex": "^A", "$options": "i" } })
                )
                .unwrap(),
            2
        );
    }

    #[test]
    fn test_where_rejected() {
        let store = seeded();
        let err = store
            .count("people", Some(&doc! { "$where": "this.x" }))
            .unwrap_err();
        assert_eq!(err, StoreError::UnsupportedOperator("$where".into()));
    }

    #[test]
    fn test_find_sort_skip_limit_projection() {
        let store = seeded();
        let rows = store
            .find(
                "people",
                None,
                Some(&doc! { "name": 1 }),
                1,
                1,
                &[("age".to_string(), -1)],
            )
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_str("name").unwrap(), "alan");
        assert!(rows[0].get("age").is_none());
        assert!(rows[0].get("_id").is_some());
    }

    #[test]
    fn test_update_set_and_pull() {
        let mut store = seeded();
        let outcome = store
            .update_many(
                "people",
                &doc! { "tags": "y" },
                &doc! { "$pull": { "tags": "y" } },
                true,
            )
            .unwrap();
        assert_eq!(outcome.matched, 2);
        assert_eq!(store.count("people", Some(&doc! { "tags": "y" })).unwrap(), 0);

        store
            .update_many(
                "people",
                &doc! { "name": "alan" },
                &doc! { "$set": { "age": 42i64 } },
                true,
            )
            .unwrap();
        assert_eq!(
            store.count("people", Some(&doc! { "age": 42i64 })).unwrap(),
            1
        );
    }

    #[test]
    fn test_group_accumulators() {
        let store = seeded();
        let out = store
            .aggregate(
                "people",
                &[doc! { "$group": { "_id": null, "total": { "$sum": "$age" }, "n": { "$sum": 1 }, "top": { "$max": "$age" } } }],
            )
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get_i64("total").unwrap(), 122);
        assert_eq!(out[0].get_i64("n").unwrap(), 3);
        assert_eq!(out[0].get_i64("top").unwrap(), 45);
    }

    #[test]
    fn test_group_over_empty_input_produces_no_rows() {
        let store = MemoryStore::new();
        let out = store
            .aggregate(
                "people",
                &[doc! { "$group": { "_id": null, "total": { "$sum": "$age" } } }],
            )
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_project_expressions() {
        let store = seeded();
        let out = store
            .aggregate(
                "people",
                &[
                    doc! { "$match": { "name": "ada" } },
                    doc! { "$project": { "name": 1, "next": { "$add": ["$age", 1i64] }, "greeting": { "$concat": ["hi ", "$name"] } } },
                ],
            )
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get_i64("next").unwrap(), 37);
        assert_eq!(out[0].get_str("greeting").unwrap(), "hi ada");
        assert!(out[0].get("_id").is_some());
    }

    #[test]
    fn test_delete_many() {
        let mut store = seeded();
        let outcome = store
            .delete_many("people", &doc! { "age": { "$lt": 42i64 } }, true)
            .unwrap();
        assert_eq!(outcome.deleted, 2);
        assert_eq!(store.collection("people").len(), 1);
    }
}
