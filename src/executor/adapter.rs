//! Query executor
//!
//! `Adapter` runs algebra operations against a `DocumentStore`:
//!
//! - `count` / `select` compile the query and read
//! - `insert` / `update` / `delete` coerce values through the codec and
//!   write, honoring the acknowledged-write setting
//! - `delete` walks inbound references afterwards and applies each
//!   field's on-delete policy (cascade or null-out, singular or list)
//!
//! Selects that request any computed expression run as an aggregation
//! pipeline; updates that assign any computed expression run as a
//! fetch-project-replace loop, since plain update documents cannot carry
//! expressions.

use bson::oid::ObjectId;
use bson::{doc, Bson, Document};

use crate::algebra::{Constant, Expr, Field, FieldType, Query, Schema, TableSchema};
use crate::codec::{self, object_id_to_int};
use crate::compiler::{expand, expand_query, field_name, CompileError, CompileMode};
use crate::observability::Logger;
use crate::store::DocumentStore;

use super::attributes::SelectAttributes;
use super::errors::{ExecError, ExecResult};
use super::result::Rows;

/// Executor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Whether writes are acknowledged when a call does not say
    pub default_safe: bool,
    /// Server feature level, gates `$literal` in update pipelines
    pub server_version: (u32, u32),
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            default_safe: true,
            server_version: (3, 0),
        }
    }
}

impl AdapterConfig {
    /// Per-call override wins, otherwise the configured default
    pub fn resolve_safe(&self, safe: Option<bool>) -> bool {
        safe.unwrap_or(self.default_safe)
    }

    /// `$literal` exists from server 2.6 on
    pub fn supports_literal(&self) -> bool {
        self.server_version >= (2, 6)
    }
}

/// One requested output column of a select
struct Column {
    /// Document key the value arrives under
    key: String,
    /// Result label
    label: String,
    /// Declared type when the column is a plain field
    ftype: Option<FieldType>,
}

/// Executes algebra operations against a document store
pub struct Adapter<S: DocumentStore> {
    store: S,
    schema: Schema,
    config: AdapterConfig,
}

impl<S: DocumentStore> Adapter<S> {
    pub fn new(store: S, schema: Schema) -> Self {
        Self::with_config(store, schema, AdapterConfig::default())
    }

    pub fn with_config(store: S, schema: Schema, config: AdapterConfig) -> Self {
        Self {
            store,
            schema,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    fn table_for(&self, name: &str) -> ExecResult<&TableSchema> {
        self.schema
            .table(name)
            .ok_or_else(|| ExecError::UnknownTable(name.to_string()))
    }

    /// Counts the documents matching a query
    pub fn count(&self, query: &Query, distinct: bool) -> ExecResult<u64> {
        if distinct {
            return Err(ExecError::CountDistinct);
        }
        let collection = query.table().ok_or(ExecError::NoCollection)?.to_string();
        self.table_for(&collection)?;
        let filter = expand_query(query, CompileMode::Filter)?;
        Ok(self.store.count(&collection, Some(&filter))?)
    }

    /// Runs a select and reassembles the result rectangle
    pub fn select(
        &self,
        query: Option<&Query>,
        fields: &[Expr],
        attributes: &SelectAttributes,
    ) -> ExecResult<Rows> {
        if attributes.for_update {
            Logger::warn("SELECT_OPTION_IGNORED", &[("option", "for_update")]);
        }
        for extra in &attributes.extras {
            Logger::warn("SELECT_OPTION_IGNORED", &[("option", extra.as_str())]);
        }

        let collection = query
            .and_then(Query::table)
            .or_else(|| fields.iter().find_map(Expr::table))
            .ok_or(ExecError::NoCollection)?
            .to_string();
        let table = self.table_for(&collection)?;

        let filter = match query {
            Some(query) => Some(expand_query(query, CompileMode::Filter)?),
            None => None,
        };

        // empty field list means every declared field
        let all_fields: Vec<Expr>;
        let fields = if fields.is_empty() {
            all_fields = table.fields.iter().map(Field::expr).collect();
            &all_fields
        } else {
            fields
        };

        let pipeline_path = fields.iter().any(|f| !matches!(f, Expr::Field(_)));
        if pipeline_path {
            self.select_pipeline(&collection, filter, fields, attributes)
        } else {
            self.select_find(&collection, filter, fields, attributes)
        }
    }

    fn select_find(
        &self,
        collection: &str,
        filter: Option<Document>,
        fields: &[Expr],
        attributes: &SelectAttributes,
    ) -> ExecResult<Rows> {
        let mut projection = Document::new();
        let mut columns = Vec::with_capacity(fields.len());
        for expr in fields {
            let field = match expr {
                Expr::Field(field) => field,
                // pipeline_path covers everything else
                _ => unreachable!("plain select handles field references only"),
            };
            let key = field_name(field, CompileMode::Filter);
            projection.insert(key.clone(), 1);
            columns.push(Column {
                key,
                label: format!("{}.{}", field.table, field.name),
                ftype: Some(field.ftype.clone()),
            });
        }

        let sort = match &attributes.orderby {
            Some(orderby) => parse_orderby(orderby)?,
            None => Vec::new(),
        };
        let (skip, limit) = attributes.limitby.unwrap_or((0, 0));

        let documents = self.store.find(
            collection,
            filter.as_ref(),
            Some(&projection),
            skip,
            limit,
            &sort,
        )?;

        let mut rows = Rows::new(columns.iter().map(|c| c.label.clone()).collect());
        for document in &documents {
            rows.rows.push(assemble_row(document, &columns));
        }
        Ok(rows)
    }

    fn select_pipeline(
        &self,
        collection: &str,
        filter: Option<Document>,
        fields: &[Expr],
        attributes: &SelectAttributes,
    ) -> ExecResult<Rows> {
        if attributes.orderby.is_some() {
            Logger::warn("SELECT_OPTION_IGNORED", &[("option", "orderby")]);
        }
        if attributes.limitby.is_some() {
            Logger::warn("SELECT_OPTION_IGNORED", &[("option", "limitby")]);
        }

        let mut group = doc! { "_id": Bson::Null };
        let mut columns = Vec::with_capacity(fields.len());
        for (index, expr) in fields.iter().enumerate() {
            let key = format!("_col_{}", index);
            let (label, accumulator, ftype) = match expr {
                Expr::Field(field) => (
                    format!("{}.{}", field.table, field.name),
                    Bson::Document(doc! {
                        "$first": format!("${}", field_name(field, CompileMode::Filter))
                    }),
                    Some(field.ftype.clone()),
                ),
                other => {
                    let fragment = expand(other, None, CompileMode::Aggregate)?;
                    (fragment.to_string(), fragment, None)
                }
            };
            group.insert(key.clone(), accumulator);
            columns.push(Column { key, label, ftype });
        }

        let mut pipeline = Vec::new();
        if let Some(filter) = filter {
            pipeline.push(doc! { "$match": filter });
        }
        pipeline.push(doc! { "$group": group });

        let documents = self.store.aggregate(collection, &pipeline)?;

        let mut rows = Rows::new(columns.iter().map(|c| c.label.clone()).collect());
        if documents.is_empty() {
            // aggregates over nothing still yield a row of nulls
            rows.rows.push(vec![Constant::Null; columns.len()]);
        } else {
            for document in &documents {
                rows.rows.push(assemble_row(document, &columns));
            }
        }
        Ok(rows)
    }

    /// Inserts one record; returns its identifier when acknowledged
    pub fn insert(
        &mut self,
        table: &str,
        values: &[(String, Constant)],
        safe: Option<bool>,
    ) -> ExecResult<Option<u128>> {
        let schema = self.table_for(table)?.clone();
        let mut document = Document::new();
        for (name, value) in values {
            let field = schema
                .field(name)
                .ok_or_else(|| ExecError::UnknownField(table.to_string(), name.clone()))?;
            // the store assigns identifiers
            if field.ftype.is_id() {
                continue;
            }
            document.insert(name.clone(), codec::represent(value, &field.ftype)?);
        }
        let safe = self.config.resolve_safe(safe);
        let outcome = self.store.insert_one(table, document, safe)?;
        if !safe {
            return Ok(None);
        }
        Ok(outcome.inserted_id.as_ref().map(object_id_to_int))
    }

    /// Updates matching records; returns the affected count
    pub fn update(
        &mut self,
        table: &str,
        query: &Query,
        values: &[(String, Expr)],
        safe: Option<bool>,
    ) -> ExecResult<u64> {
        let schema = self.table_for(table)?.clone();
        let filter = expand_query(query, CompileMode::Filter)?;
        let safe = self.config.resolve_safe(safe);

        // unacknowledged writes report the pre-count; nothing matching
        // means nothing to write
        let precount = if safe {
            0
        } else {
            let amount = self.store.count(table, Some(&filter))?;
            if amount == 0 {
                return Ok(0);
            }
            amount
        };

        let expression_mode = values
            .iter()
            .any(|(_, expr)| !matches!(expr, Expr::Value(_)));
        if expression_mode {
            return self.update_pipeline(&schema, &filter, values, safe, precount);
        }

        let mut set = Document::new();
        for (name, expr) in values {
            let field = schema
                .field(name)
                .ok_or_else(|| ExecError::UnknownField(table.to_string(), name.clone()))?;
            // identifiers are immutable, never part of the write
            if field.ftype.is_id() {
                continue;
            }
            let constant = match expr {
                Expr::Value(constant) => constant,
                _ => unreachable!("expression assignments take the pipeline path"),
            };
            set.insert(name.clone(), codec::represent(constant, &field.ftype)?);
        }
        let outcome = self
            .store
            .update_many(table, &filter, &doc! { "$set": set }, safe)
            .map_err(|source| ExecError::UpdateFailed { source })?;
        Ok(if safe { outcome.matched } else { precount })
    }

    /// Expression assignments: project every document through the
    /// compiled expressions and replace it
    fn update_pipeline(
        &mut self,
        schema: &TableSchema,
        filter: &Document,
        values: &[(String, Expr)],
        safe: bool,
        precount: u64,
    ) -> ExecResult<u64> {
        let mut projection = Document::new();
        for field in &schema.fields {
            if field.ftype.is_id() {
                continue;
            }
            projection.insert(field.name.clone(), 1);
        }
        for (name, expr) in values {
            let field = schema
                .field(name)
                .ok_or_else(|| ExecError::UnknownField(schema.name.clone(), name.clone()))?;
            // identifiers are immutable, never part of the write
            if field.ftype.is_id() {
                continue;
            }
            let fragment = match expr {
                Expr::Value(constant) => {
                    self.wrap_literal(codec::represent(constant, &field.ftype)?, &field.ftype)?
                }
                other => expand(other, None, CompileMode::Aggregate)?,
            };
            projection.insert(name.clone(), fragment);
        }

        let pipeline = [
            doc! { "$match": filter.clone() },
            doc! { "$project": projection },
        ];
        let projected = self
            .store
            .aggregate(&schema.name, &pipeline)
            .map_err(|source| ExecError::UpdateFailed { source })?;

        let mut matched = 0u64;
        for mut document in projected {
            let id = document
                .remove("_id")
                .ok_or(CompileError::InvalidQuery("projected document lost its identifier".into()))
                .map_err(ExecError::Compile)?;
            let outcome = self
                .store
                .replace_one(&schema.name, &doc! { "_id": id }, document, safe)
                .map_err(|source| ExecError::UpdateFailed { source })?;
            matched += outcome.matched;
        }
        Ok(if safe { matched } else { precount })
    }

    /// Scalar assignments inside a projection must not read as field
    /// paths or inclusion flags
    fn wrap_literal(&self, value: Bson, ftype: &FieldType) -> ExecResult<Bson> {
        if self.config.supports_literal() {
            return Ok(Bson::Document(doc! { "$literal": value }));
        }
        if ftype.is_textual() {
            Ok(Bson::Document(doc! { "$concat": [value] }))
        } else if ftype.is_numeric() || ftype.is_temporal() {
            Ok(Bson::Document(doc! { "$add": [value] }))
        } else if matches!(ftype, FieldType::Boolean) {
            Ok(Bson::Document(doc! { "$and": [value] }))
        } else {
            Err(ExecError::LegacyExpressionUpdate(
                ftype.type_name().to_string(),
            ))
        }
    }

    /// Deletes matching records, then repairs inbound references
    pub fn delete(&mut self, table: &str, query: &Query, safe: Option<bool>) -> ExecResult<u64> {
        self.table_for(table)?;
        let filter = expand_query(query, CompileMode::Filter)?;
        let safe = self.config.resolve_safe(safe);

        // snapshot the victims first, the cascade needs their ids
        let victims = self
            .store
            .find(table, Some(&filter), Some(&doc! { "_id": 1 }), 0, 0, &[])?;
        let mut ids = Vec::with_capacity(victims.len());
        for victim in &victims {
            match victim.get("_id") {
                Some(Bson::ObjectId(oid)) => ids.push(*oid),
                _ => continue,
            }
        }

        let outcome = self.store.delete_many(table, &filter, safe)?;
        let amount = if safe {
            outcome.deleted
        } else {
            ids.len() as u64
        };

        if !ids.is_empty() {
            self.repair_references(table, &ids, safe)?;
        }
        Ok(amount)
    }

    /// Applies each inbound reference field's on-delete policy
    fn repair_references(&mut self, table: &str, ids: &[ObjectId], safe: bool) -> ExecResult<()> {
        let refs = self.schema.referenced_by(table);
        let id_constants: Vec<Constant> = ids
            .iter()
            .map(|oid| Constant::Id(object_id_to_int(oid)))
            .collect();

        for field in &refs.cascade {
            Logger::info(
                "DELETE_CASCADE",
                &[("table", field.table.as_str()), ("field", field.name.as_str())],
            );
            let inbound = field.belongs(id_constants.clone());
            self.delete(&field.table, &inbound, Some(safe))?;
        }
        for field in &refs.set_null {
            Logger::info(
                "DELETE_SET_NULL",
                &[("table", field.table.as_str()), ("field", field.name.as_str())],
            );
            let inbound = field.belongs(id_constants.clone());
            self.update(
                &field.table,
                &inbound,
                &[(field.name.clone(), Expr::Value(Constant::Null))],
                Some(safe),
            )?;
        }
        for field in &refs.cascade_list {
            for oid in ids {
                // a list shrunk to nothing means the record goes too
                let sole = one(&field.name, Bson::Array(vec![Bson::ObjectId(*oid)]));
                self.store.delete_many(&field.table, &sole, safe)?;
                let member = one(&field.name, Bson::ObjectId(*oid));
                let pull = one("$pull", Bson::Document(member.clone()));
                self.store.update_many(&field.table, &member, &pull, safe)?;
            }
        }
        for field in &refs.set_null_list {
            for oid in ids {
                let member = one(&field.name, Bson::ObjectId(*oid));
                let pull = one("$pull", Bson::Document(member.clone()));
                self.store.update_many(&field.table, &member, &pull, safe)?;
            }
        }
        Ok(())
    }
}

/// Single-entry document with a runtime key
fn one(key: &str, value: Bson) -> Document {
    let mut out = Document::new();
    out.insert(key.to_string(), value);
    out
}

/// Renders an orderby expression into (key, direction) pairs
fn parse_orderby(orderby: &Expr) -> ExecResult<Vec<(String, i32)>> {
    let rendered = match expand(orderby, None, CompileMode::Filter)? {
        Bson::String(s) => s,
        other => {
            return Err(ExecError::Compile(CompileError::InvalidQuery(format!(
                "orderby compiled to a non-name fragment: {}",
                other
            ))))
        }
    };
    let mut sort = Vec::new();
    for part in rendered.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.strip_prefix('-') {
            Some(name) => sort.push((name.to_string(), -1)),
            None => sort.push((part.to_string(), 1)),
        }
    }
    Ok(sort)
}

/// One result row in request order; missing keys surface as null
fn assemble_row(document: &Document, columns: &[Column]) -> Vec<Constant> {
    columns
        .iter()
        .map(|column| match document.get(&column.key) {
            Some(Bson::Null) | None => Constant::Null,
            Some(value) => match &column.ftype {
                Some(ftype) => codec::parse(value, ftype),
                None => codec::parse_untyped(value),
            },
        })
        .collect()
}
