//! Expression and query tree for the backend-agnostic algebra
//!
//! A query is a binary tree: leaves are field references or literal
//! constants, interior nodes carry an operator, one or two operands, and
//! optional keyword arguments. The whole tree is a closed tagged type, so
//! the compiler's dispatch is exhaustive.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::types::{Field, FieldType};

/// A literal algebra value
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// Absent / null
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// UTF-8 text
    Str(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Calendar date
    Date(NaiveDate),
    /// Time of day
    Time(NaiveTime),
    /// Combined date and time
    DateTime(NaiveDateTime),
    /// Algebra-side identifier (96-bit ObjectId value)
    Id(u128),
    /// Homogeneous list
    List(Vec<Constant>),
}

impl Constant {
    /// Returns the constant's class name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Constant::Null => "null",
            Constant::Bool(_) => "bool",
            Constant::Int(_) => "int",
            Constant::Float(_) => "float",
            Constant::Str(_) => "str",
            Constant::Bytes(_) => "bytes",
            Constant::Date(_) => "date",
            Constant::Time(_) => "time",
            Constant::DateTime(_) => "datetime",
            Constant::Id(_) => "id",
            Constant::List(_) => "list",
        }
    }

    /// Returns true for null
    pub fn is_null(&self) -> bool {
        matches!(self, Constant::Null)
    }
}

impl From<bool> for Constant {
    fn from(v: bool) -> Self {
        Constant::Bool(v)
    }
}

impl From<i64> for Constant {
    fn from(v: i64) -> Self {
        Constant::Int(v)
    }
}

impl From<i32> for Constant {
    fn from(v: i32) -> Self {
        Constant::Int(v as i64)
    }
}

impl From<f64> for Constant {
    fn from(v: f64) -> Self {
        Constant::Float(v)
    }
}

impl From<&str> for Constant {
    fn from(v: &str) -> Self {
        Constant::Str(v.to_string())
    }
}

impl From<String> for Constant {
    fn from(v: String) -> Self {
        Constant::Str(v)
    }
}

impl From<Vec<u8>> for Constant {
    fn from(v: Vec<u8>) -> Self {
        Constant::Bytes(v)
    }
}

impl From<u128> for Constant {
    fn from(v: u128) -> Self {
        Constant::Id(v)
    }
}

impl From<NaiveDate> for Constant {
    fn from(v: NaiveDate) -> Self {
        Constant::Date(v)
    }
}

impl From<NaiveTime> for Constant {
    fn from(v: NaiveTime) -> Self {
        Constant::Time(v)
    }
}

impl From<NaiveDateTime> for Constant {
    fn from(v: NaiveDateTime) -> Self {
        Constant::DateTime(v)
    }
}

/// Operator kinds understood by the compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
    Not,
    Invert,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Belongs,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Sum,
    Max,
    Min,
    Avg,
    Count,
    Like,
    Ilike,
    StartsWith,
    EndsWith,
    Contains,
    Comma,
    As,
    On,
}

impl Operator {
    /// Returns the operator name for error messages
    pub fn name(&self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Not => "NOT",
            Operator::Invert => "INVERT",
            Operator::Eq => "EQ",
            Operator::Ne => "NE",
            Operator::Lt => "LT",
            Operator::Le => "LE",
            Operator::Gt => "GT",
            Operator::Ge => "GE",
            Operator::Belongs => "BELONGS",
            Operator::Add => "ADD",
            Operator::Sub => "SUB",
            Operator::Mul => "MUL",
            Operator::Div => "DIV",
            Operator::Mod => "MOD",
            Operator::Sum => "SUM",
            Operator::Max => "MAX",
            Operator::Min => "MIN",
            Operator::Avg => "AVG",
            Operator::Count => "COUNT",
            Operator::Like => "LIKE",
            Operator::Ilike => "ILIKE",
            Operator::StartsWith => "STARTSWITH",
            Operator::EndsWith => "ENDSWITH",
            Operator::Contains => "CONTAINS",
            Operator::Comma => "COMMA",
            Operator::As => "AS",
            Operator::On => "ON",
        }
    }
}

/// Keyword arguments carried by an operator node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpOptions {
    /// Pattern operators: case-sensitive matching
    pub case_sensitive: bool,
    /// COUNT: distinct counting requested
    pub distinct: bool,
}

impl Default for OpOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            distinct: false,
        }
    }
}

/// A node in the algebra tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Field reference leaf
    Field(Field),
    /// Literal value leaf
    Value(Constant),
    /// Operator node with one or two operands
    Op {
        op: Operator,
        first: Box<Expr>,
        second: Option<Box<Expr>>,
        opts: OpOptions,
    },
    /// Verbatim pass-through fragment
    Raw(String),
}

impl Expr {
    /// Wraps a constant
    pub fn value(v: impl Into<Constant>) -> Self {
        Expr::Value(v.into())
    }

    /// Builds a unary operator node
    pub fn unary(op: Operator, first: Expr) -> Self {
        Expr::Op {
            op,
            first: Box::new(first),
            second: None,
            opts: OpOptions::default(),
        }
    }

    /// Builds a binary operator node; `second` may be absent
    pub fn binary(op: Operator, first: Expr, second: Option<Expr>) -> Self {
        Expr::Op {
            op,
            first: Box::new(first),
            second: second.map(Box::new),
            opts: OpOptions::default(),
        }
    }

    /// Builds an operator node with explicit keyword arguments
    pub fn with_opts(op: Operator, first: Expr, second: Option<Expr>, opts: OpOptions) -> Self {
        Expr::Op {
            op,
            first: Box::new(first),
            second: second.map(Box::new),
            opts,
        }
    }

    /// The declared field type of this node, when it has one
    pub fn field_type(&self) -> Option<&FieldType> {
        match self {
            Expr::Field(f) => Some(&f.ftype),
            _ => None,
        }
    }

    /// The owning table of the first field reference in the tree
    pub fn table(&self) -> Option<&str> {
        match self {
            Expr::Field(f) => Some(&f.table),
            Expr::Op { first, second, .. } => first
                .table()
                .or_else(|| second.as_ref().and_then(|s| s.table())),
            _ => None,
        }
    }

    /// Arithmetic sum (string concatenation on textual fields)
    pub fn add(self, other: Expr) -> Expr {
        Expr::binary(Operator::Add, self, Some(other))
    }

    /// Arithmetic difference
    pub fn sub(self, other: Expr) -> Expr {
        Expr::binary(Operator::Sub, self, Some(other))
    }

    /// Arithmetic product
    pub fn mul(self, other: Expr) -> Expr {
        Expr::binary(Operator::Mul, self, Some(other))
    }

    /// Arithmetic quotient
    pub fn div(self, other: Expr) -> Expr {
        Expr::binary(Operator::Div, self, Some(other))
    }

    /// Arithmetic remainder
    pub fn rem(self, other: Expr) -> Expr {
        Expr::binary(Operator::Mod, self, Some(other))
    }

    /// Orderby list: renders as "first, second"
    pub fn comma(self, other: Expr) -> Expr {
        Expr::binary(Operator::Comma, self, Some(other))
    }
}

/// A boolean-valued algebra tree usable as a filter
#[derive(Debug, Clone, PartialEq)]
pub struct Query(pub Expr);

impl Query {
    /// Conjunction
    pub fn and(self, other: Query) -> Query {
        Query(Expr::binary(Operator::And, self.0, Some(other.0)))
    }

    /// Disjunction
    pub fn or(self, other: Query) -> Query {
        Query(Expr::binary(Operator::Or, self.0, Some(other.0)))
    }

    /// Negation
    pub fn negate(self) -> Query {
        Query(Expr::unary(Operator::Not, self.0))
    }

    /// The owning table of the first field reference in the tree
    pub fn table(&self) -> Option<&str> {
        self.0.table()
    }
}

impl Field {
    /// This field as an expression leaf
    pub fn expr(&self) -> Expr {
        Expr::Field(self.clone())
    }

    fn compare(&self, op: Operator, value: impl Into<Constant>) -> Query {
        Query(Expr::binary(op, self.expr(), Some(Expr::value(value))))
    }

    /// field == value
    pub fn eq(&self, value: impl Into<Constant>) -> Query {
        self.compare(Operator::Eq, value)
    }

    /// field != value
    pub fn ne(&self, value: impl Into<Constant>) -> Query {
        self.compare(Operator::Ne, value)
    }

    /// field < value
    pub fn lt(&self, value: impl Into<Constant>) -> Query {
        self.compare(Operator::Lt, value)
    }

    /// field <= value
    pub fn le(&self, value: impl Into<Constant>) -> Query {
        self.compare(Operator::Le, value)
    }

    /// field > value
    pub fn gt(&self, value: impl Into<Constant>) -> Query {
        self.compare(Operator::Gt, value)
    }

    /// field >= value
    pub fn ge(&self, value: impl Into<Constant>) -> Query {
        self.compare(Operator::Ge, value)
    }

    /// field IN (items)
    pub fn belongs(&self, items: Vec<Constant>) -> Query {
        Query(Expr::binary(
            Operator::Belongs,
            self.expr(),
            Some(Expr::Value(Constant::List(items))),
        ))
    }

    /// SQL LIKE with % and _ wildcards
    pub fn like(&self, pattern: impl Into<String>) -> Query {
        Query(Expr::binary(
            Operator::Like,
            self.expr(),
            Some(Expr::value(pattern.into())),
        ))
    }

    /// Case-insensitive LIKE
    pub fn ilike(&self, pattern: impl Into<String>) -> Query {
        Query(Expr::binary(
            Operator::Ilike,
            self.expr(),
            Some(Expr::value(pattern.into())),
        ))
    }

    /// Literal prefix match
    pub fn startswith(&self, prefix: impl Into<String>) -> Query {
        Query(Expr::binary(
            Operator::StartsWith,
            self.expr(),
            Some(Expr::value(prefix.into())),
        ))
    }

    /// Literal suffix match
    pub fn endswith(&self, suffix: impl Into<String>) -> Query {
        Query(Expr::binary(
            Operator::EndsWith,
            self.expr(),
            Some(Expr::value(suffix.into())),
        ))
    }

    /// Literal containment match
    pub fn contains(&self, needle: Expr, case_sensitive: bool) -> Query {
        Query(Expr::with_opts(
            Operator::Contains,
            self.expr(),
            Some(needle),
            OpOptions {
                case_sensitive,
                ..OpOptions::default()
            },
        ))
    }

    /// Aggregate sum over this field
    pub fn sum(&self) -> Expr {
        Expr::unary(Operator::Sum, self.expr())
    }

    /// Aggregate maximum over this field
    pub fn max(&self) -> Expr {
        Expr::unary(Operator::Max, self.expr())
    }

    /// Aggregate minimum over this field
    pub fn min(&self) -> Expr {
        Expr::unary(Operator::Min, self.expr())
    }

    /// Aggregate mean over this field
    pub fn avg(&self) -> Expr {
        Expr::unary(Operator::Avg, self.expr())
    }

    /// Row count
    pub fn count(&self, distinct: bool) -> Expr {
        Expr::with_opts(
            Operator::Count,
            self.expr(),
            None,
            OpOptions {
                distinct,
                ..OpOptions::default()
            },
        )
    }

    /// Descending orderby marker
    pub fn invert(&self) -> Expr {
        Expr::unary(Operator::Invert, self.expr())
    }
}
