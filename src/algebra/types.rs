//! Field, table, and schema definitions for the query algebra
//!
//! Declared semantic types:
//! - scalars: boolean, string, text, json, password, blob, upload,
//!   integer, bigint, float, double
//! - temporal: date, time, datetime
//! - identifiers: id, reference
//! - lists: list:string, list:integer, list:reference

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declared semantic type of a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Boolean
    Boolean,
    /// UTF-8 string
    String,
    /// Long-form text
    Text,
    /// JSON payload stored as text
    Json,
    /// Hashed password text
    Password,
    /// Opaque byte payload
    Blob,
    /// Uploaded file name
    Upload,
    /// 64-bit signed integer
    Integer,
    /// 64-bit signed integer (wide declaration)
    Bigint,
    /// 64-bit floating point
    Float,
    /// 64-bit floating point (wide declaration)
    Double,
    /// Calendar date (no native bare-date in the store)
    Date,
    /// Time of day (no native bare-time in the store)
    Time,
    /// Combined date and time
    Datetime,
    /// Primary identifier
    Id,
    /// Singular reference to another table
    Reference(String),
    /// Homogeneous list of strings
    ListString,
    /// Homogeneous list of integers
    ListInteger,
    /// List of references to another table
    ListReference(String),
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Boolean => "boolean",
            FieldType::String => "string",
            FieldType::Text => "text",
            FieldType::Json => "json",
            FieldType::Password => "password",
            FieldType::Blob => "blob",
            FieldType::Upload => "upload",
            FieldType::Integer => "integer",
            FieldType::Bigint => "bigint",
            FieldType::Float => "float",
            FieldType::Double => "double",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::Datetime => "datetime",
            FieldType::Id => "id",
            FieldType::Reference(_) => "reference",
            FieldType::ListString => "list:string",
            FieldType::ListInteger => "list:integer",
            FieldType::ListReference(_) => "list:reference",
        }
    }

    /// Returns true for the primary identifier type
    pub fn is_id(&self) -> bool {
        matches!(self, FieldType::Id)
    }

    /// Returns true for identifier-valued types (id and singular reference)
    pub fn is_identifier(&self) -> bool {
        matches!(self, FieldType::Id | FieldType::Reference(_))
    }

    /// Returns true for textually stored types
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            FieldType::String | FieldType::Text | FieldType::Password
        )
    }

    /// Returns true for numeric types
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldType::Integer | FieldType::Bigint | FieldType::Float | FieldType::Double
        )
    }

    /// Returns true for temporal types
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            FieldType::Date | FieldType::Time | FieldType::Datetime
        )
    }
}

/// Referential-integrity policy applied to dependent records when the
/// referenced record is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnDelete {
    /// Delete (or shrink) the referencing record
    Cascade,
    /// Null out (or shrink) the referencing field
    SetNull,
}

/// A field descriptor: owning table, name, declared type, and the
/// on-delete policy for reference-typed fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Owning table name
    pub table: String,
    /// Field name
    pub name: String,
    /// Declared semantic type
    pub ftype: FieldType,
    /// On-delete policy (meaningful for reference types only)
    pub ondelete: OnDelete,
}

impl Field {
    /// Creates a field with the default CASCADE on-delete policy
    pub fn new(table: impl Into<String>, name: impl Into<String>, ftype: FieldType) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
            ftype,
            ondelete: OnDelete::Cascade,
        }
    }

    /// Sets the on-delete policy
    pub fn with_ondelete(mut self, policy: OnDelete) -> Self {
        self.ondelete = policy;
        self
    }
}

/// A table definition: name plus its field descriptors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table (collection) name
    pub name: String,
    /// Field descriptors in declaration order
    pub fields: Vec<Field>,
}

impl TableSchema {
    /// Creates an empty table definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a field, stamping the owning table name
    pub fn with_field(mut self, name: impl Into<String>, ftype: FieldType) -> Self {
        self.fields.push(Field::new(self.name.clone(), name, ftype));
        self
    }

    /// Adds a reference field with an explicit on-delete policy
    pub fn with_reference(
        mut self,
        name: impl Into<String>,
        ftype: FieldType,
        ondelete: OnDelete,
    ) -> Self {
        self.fields
            .push(Field::new(self.name.clone(), name, ftype).with_ondelete(ondelete));
        self
    }

    /// Looks up a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Inbound reference fields pointing at one table, grouped by shape and
/// on-delete policy
#[derive(Debug, Clone, Default)]
pub struct ReferencedBy {
    /// Singular references with CASCADE
    pub cascade: Vec<Field>,
    /// Singular references with SET NULL
    pub set_null: Vec<Field>,
    /// List references with CASCADE
    pub cascade_list: Vec<Field>,
    /// List references with SET NULL
    pub set_null_list: Vec<Field>,
}

/// Registry of table definitions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    tables: BTreeMap<String, TableSchema>,
}

impl Schema {
    /// Creates an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table definition
    pub fn with_table(mut self, table: TableSchema) -> Self {
        self.tables.insert(table.name.clone(), table);
        self
    }

    /// Looks up a table by name
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    /// Collects every field elsewhere in the schema that references the
    /// given table, grouped singular vs. list-valued per on-delete policy
    pub fn referenced_by(&self, tablename: &str) -> ReferencedBy {
        let mut refs = ReferencedBy::default();
        for table in self.tables.values() {
            for field in &table.fields {
                match &field.ftype {
                    FieldType::Reference(target) if target == tablename => {
                        match field.ondelete {
                            OnDelete::Cascade => refs.cascade.push(field.clone()),
                            OnDelete::SetNull => refs.set_null.push(field.clone()),
                        }
                    }
                    FieldType::ListReference(target) if target == tablename => {
                        match field.ondelete {
                            OnDelete::Cascade => refs.cascade_list.push(field.clone()),
                            OnDelete::SetNull => refs.set_null_list.push(field.clone()),
                        }
                    }
                    _ => {}
                }
            }
        }
        refs
    }
}
