//! The closed set of filter operators and how each compiles against a column.

use serde::{Serialize, Serializer};
use serde_json::Value;

use super::temporal;
use crate::error::{CompileError, CompileResult};
use crate::resolve::ResolvedColumn;
use crate::schema::TypeCategory;
use crate::sql::{cast_text, lit_bool, lit_float, lit_int, lit_str, Expr, ExprExt};

/// Escape character used in every generated LIKE pattern.
pub const LIKE_ESCAPE: char = '!';

/// Logical combinators of a filter tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

impl LogicalOp {
    pub fn token(self) -> &'static str {
        match self {
            LogicalOp::And => "$and",
            LogicalOp::Or => "$or",
            LogicalOp::Not => "$not",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "$and" => Some(LogicalOp::And),
            "$or" => Some(LogicalOp::Or),
            "$not" => Some(LogicalOp::Not),
            _ => None,
        }
    }
}

/// Comparison operators applied to a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Contains,
    NContains,
    StartsWith,
    EndsWith,
    IsEmpty,
    IsNotEmpty,
    IsAnyOf,
}

/// What kind of operand an operator takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandShape {
    /// Operand is ignored.
    None,
    Scalar,
    List,
}

use ComparisonOp::*;

const STRING_OPS: &[ComparisonOp] = &[
    Eq, Ne, In, Contains, NContains, StartsWith, EndsWith, IsEmpty, IsNotEmpty, IsAnyOf,
];
const NUMBER_OPS: &[ComparisonOp] = &[Eq, Ne, Gt, Gte, Lt, Lte, In, IsEmpty, IsNotEmpty, IsAnyOf];
const BOOLEAN_OPS: &[ComparisonOp] = &[Eq, Ne, IsEmpty, IsNotEmpty];
const DATETIME_OPS: &[ComparisonOp] = &[Eq, Ne, Gt, Gte, Lt, Lte, IsEmpty, IsNotEmpty, IsAnyOf];

impl ComparisonOp {
    pub const ALL: [ComparisonOp; 14] = [
        Eq, Ne, Gt, Gte, Lt, Lte, In, Contains, NContains, StartsWith, EndsWith, IsEmpty,
        IsNotEmpty, IsAnyOf,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Eq => "$eq",
            Ne => "$ne",
            Gt => "$gt",
            Gte => "$gte",
            Lt => "$lt",
            Lte => "$lte",
            In => "$in",
            Contains => "$contains",
            NContains => "$ncontains",
            StartsWith => "$startswith",
            EndsWith => "$endswith",
            IsEmpty => "$isempty",
            IsNotEmpty => "$isnotempty",
            IsAnyOf => "$isanyof",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.token() == token)
    }

    /// Operators permitted on a column of the given category, in display order.
    pub fn allowed_for(category: TypeCategory) -> &'static [ComparisonOp] {
        match category {
            TypeCategory::String => STRING_OPS,
            TypeCategory::Number => NUMBER_OPS,
            TypeCategory::Boolean => BOOLEAN_OPS,
            TypeCategory::Datetime => DATETIME_OPS,
        }
    }

    /// Human-readable description, worded for the column category.
    pub fn description(self, category: TypeCategory) -> &'static str {
        if category == TypeCategory::Datetime {
            match self {
                Eq => return "Exact date",
                Ne => return "Not the exact date",
                Gt => return "After",
                Lt => return "Before",
                Lte => return "Until",
                _ => {}
            }
        }
        match self {
            Eq => "Equal to",
            Ne => "Not equal to",
            Gt => "Greater than",
            Gte => "Greater than or equal to",
            Lt => "Less than",
            Lte => "Less than or equal to",
            In => "Is in the list",
            Contains => "Contains the text",
            NContains => "Does not contain the text",
            StartsWith => "Starts with",
            EndsWith => "Ends with",
            IsEmpty => "Is empty",
            IsNotEmpty => "Is not empty",
            IsAnyOf => "Is any of",
        }
    }

    pub fn operand_shape(self) -> OperandShape {
        match self {
            IsEmpty | IsNotEmpty => OperandShape::None,
            In | IsAnyOf => OperandShape::List,
            _ => OperandShape::Scalar,
        }
    }

    fn is_ordering(self) -> bool {
        matches!(self, Gt | Gte | Lt | Lte)
    }
}

impl std::fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

impl Serialize for ComparisonOp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

/// A single JSON scalar operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

/// The operand of a comparison, shaped for its operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    None,
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl Scalar {
    fn from_json(value: &Value) -> Option<Self> {
        Some(match value {
            Value::Null => Scalar::Null,
            Value::Bool(b) => Scalar::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Scalar::Int(i),
                None => Scalar::Float(n.as_f64()?),
            },
            Value::String(s) => Scalar::String(s.clone()),
            Value::Array(_) | Value::Object(_) => return None,
        })
    }

    fn is_blank(&self) -> bool {
        match self {
            Scalar::Null => true,
            Scalar::String(s) => s.is_empty(),
            _ => false,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Bool(_) => "a boolean",
            Scalar::Int(_) | Scalar::Float(_) => "a number",
            Scalar::String(_) => "a string",
        }
    }
}

impl Operand {
    /// Shape-check a raw JSON operand for `op`.
    pub fn from_json(op: ComparisonOp, value: &Value, field: &str) -> CompileResult<Self> {
        match op.operand_shape() {
            OperandShape::None => Ok(Operand::None),
            OperandShape::Scalar => Scalar::from_json(value)
                .map(Operand::Scalar)
                .ok_or_else(|| CompileError::operand(field, op.token(), "expected a single value")),
            OperandShape::List => {
                let items = value.as_array().ok_or_else(|| {
                    CompileError::operand(field, op.token(), "expected a list of values")
                })?;
                items
                    .iter()
                    .map(|item| {
                        Scalar::from_json(item).ok_or_else(|| {
                            CompileError::operand(field, op.token(), "list items must be single values")
                        })
                    })
                    .collect::<CompileResult<Vec<_>>>()
                    .map(Operand::List)
            }
        }
    }
}

/// Escape LIKE wildcards in user text so it matches literally.
pub fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '!' | '%' | '_' | '[') {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

/// The column as text: enums are cast so pattern matching works everywhere.
pub(crate) fn text_expr(column: &ResolvedColumn) -> Expr {
    if column.column_type.is_enum() {
        cast_text(column.expr.clone())
    } else {
        column.expr.clone()
    }
}

/// Case-insensitive "contains" predicate used by filters and search.
pub(crate) fn contains(column: &ResolvedColumn, text: &str) -> Expr {
    text_expr(column).ilike_escape(lit_str(&format!("%{}%", escape_like(text))), LIKE_ESCAPE)
}

/// Compile one comparison against a resolved column of a known category.
pub fn compile_comparison(
    column: &ResolvedColumn,
    category: TypeCategory,
    op: ComparisonOp,
    operand: &Operand,
    field: &str,
) -> CompileResult<Expr> {
    match (op, operand) {
        (IsEmpty, _) => Ok(column.expr.clone().is_null()),
        (IsNotEmpty, _) => Ok(column.expr.clone().is_not_null()),
        (In, Operand::List(items)) if category != TypeCategory::Datetime => {
            let values = items
                .iter()
                .map(|item| {
                    if matches!(item, Scalar::Null) {
                        Err(CompileError::operand(field, op.token(), "list items cannot be null"))
                    } else {
                        literal(category, op, item, field)
                    }
                })
                .collect::<CompileResult<Vec<_>>>()?;
            Ok(column.expr.clone().in_list(values))
        }
        (In | IsAnyOf, Operand::List(items)) => {
            let alternatives = items
                .iter()
                .map(|item| compile_scalar(column, category, Eq, item, field))
                .collect::<CompileResult<Vec<_>>>()?;
            Ok(Expr::disjunction(alternatives)
                .unwrap_or_else(|| column.expr.clone().in_list(vec![])))
        }
        (_, Operand::Scalar(value)) => compile_scalar(column, category, op, value, field),
        (_, _) => Err(CompileError::operand(
            field,
            op.token(),
            match op.operand_shape() {
                OperandShape::List => "expected a list of values",
                _ => "expected a single value",
            },
        )),
    }
}

fn compile_scalar(
    column: &ResolvedColumn,
    category: TypeCategory,
    op: ComparisonOp,
    value: &Scalar,
    field: &str,
) -> CompileResult<Expr> {
    match op {
        Eq if value.is_blank() => return Ok(column.expr.clone().is_null()),
        Ne if value.is_blank() => return Ok(column.expr.clone().is_not_null()),
        _ if op.is_ordering() && matches!(value, Scalar::Null) => {
            return Err(CompileError::operand(field, op.token(), "cannot compare against null"));
        }
        _ => {}
    }

    match op {
        Contains | NContains | StartsWith | EndsWith => {
            let text = pattern_text(value, op, field)?;
            let escaped = escape_like(&text);
            let pattern = match op {
                StartsWith => format!("{}%", escaped),
                EndsWith => format!("%{}", escaped),
                _ => format!("%{}%", escaped),
            };
            let target = text_expr(column);
            Ok(if op == NContains {
                target.not_ilike_escape(lit_str(&pattern), LIKE_ESCAPE)
            } else {
                target.ilike_escape(lit_str(&pattern), LIKE_ESCAPE)
            })
        }
        Eq | Ne | Gt | Gte | Lt | Lte if category == TypeCategory::Datetime => {
            let Scalar::String(raw) = value else {
                return Err(CompileError::operand(
                    field,
                    op.token(),
                    format!("expected a date string, got {}", value.kind()),
                ));
            };
            let parsed = temporal::parse_operand(raw, field)?;
            temporal::compare(column.expr.clone(), op, parsed, field)
        }
        Eq | Ne | Gt | Gte | Lt | Lte => {
            let lit = literal(category, op, value, field)?;
            let target = column.expr.clone();
            Ok(match op {
                Eq => target.eq(lit),
                Ne => target.ne(lit),
                Gt => target.gt(lit),
                Gte => target.gte(lit),
                Lt => target.lt(lit),
                _ => target.lte(lit),
            })
        }
        In | IsAnyOf | IsEmpty | IsNotEmpty => Err(CompileError::operand(
            field,
            op.token(),
            "operator does not take a single value",
        )),
    }
}

fn pattern_text(value: &Scalar, op: ComparisonOp, field: &str) -> CompileResult<String> {
    match value {
        Scalar::String(s) => Ok(s.clone()),
        Scalar::Int(n) => Ok(n.to_string()),
        Scalar::Float(f) => Ok(ryu::Buffer::new().format(*f).to_string()),
        other => Err(CompileError::operand(
            field,
            op.token(),
            format!("expected text, got {}", other.kind()),
        )),
    }
}

/// Convert a scalar to a literal appropriate for the column category.
fn literal(
    category: TypeCategory,
    op: ComparisonOp,
    value: &Scalar,
    field: &str,
) -> CompileResult<Expr> {
    let mismatch = |expected: &str| {
        CompileError::operand(
            field,
            op.token(),
            format!("expected {}, got {}", expected, value.kind()),
        )
    };

    match (category, value) {
        (TypeCategory::String, Scalar::String(s)) => Ok(lit_str(s)),
        (TypeCategory::String, Scalar::Int(n)) => Ok(lit_str(&n.to_string())),
        (TypeCategory::String, Scalar::Float(f)) => Ok(lit_str(ryu::Buffer::new().format(*f))),
        (TypeCategory::String, _) => Err(mismatch("text")),

        (TypeCategory::Number, Scalar::Int(n)) => Ok(lit_int(*n)),
        (TypeCategory::Number, Scalar::Float(f)) => Ok(lit_float(*f)),
        (TypeCategory::Number, Scalar::String(s)) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<i64>() {
                Ok(lit_int(n))
            } else {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(lit_float)
                    .ok_or_else(|| mismatch("a number"))
            }
        }
        (TypeCategory::Number, _) => Err(mismatch("a number")),

        (TypeCategory::Boolean, Scalar::Bool(b)) => Ok(lit_bool(*b)),
        (TypeCategory::Boolean, Scalar::Int(n @ (0 | 1))) => Ok(lit_bool(*n == 1)),
        (TypeCategory::Boolean, Scalar::String(s)) => match s.to_ascii_lowercase().as_str() {
            "true" => Ok(lit_bool(true)),
            "false" => Ok(lit_bool(false)),
            _ => Err(mismatch("a boolean")),
        },
        (TypeCategory::Boolean, _) => Err(mismatch("a boolean")),

        (TypeCategory::Datetime, _) => Err(mismatch("a date string")),
    }
}
