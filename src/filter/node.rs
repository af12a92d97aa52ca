//! Filter trees parsed from JSON.

use serde_json::{Map, Value};

use super::operator::{ComparisonOp, LogicalOp, Operand};
use crate::error::{CompileError, CompileResult};
use crate::path::FieldPath;

/// A node of a parsed filter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    /// `$and` / `$or` over any number of children; `$not` over exactly one.
    Logical {
        op: LogicalOp,
        children: Vec<FilterNode>,
    },
    /// A single operator applied to a field.
    Comparison {
        path: FieldPath,
        op: ComparisonOp,
        operand: Operand,
    },
}

impl FilterNode {
    /// Parse a filter clause.
    ///
    /// Several keys in one object are ANDed, as are several operators on
    /// one field.
    pub fn parse(value: &Value) -> CompileResult<Self> {
        let clause = value
            .as_object()
            .ok_or_else(|| CompileError::syntax("Filter clause must be a JSON object"))?;
        Ok(and_of(parse_clause(clause)?))
    }

    /// Parse filter JSON text.
    pub fn parse_str(raw: &str) -> CompileResult<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| CompileError::syntax(format!("Invalid filter JSON: {}", e)))?;
        Self::parse(&value)
    }

    /// Every field path referenced by this tree, in document order.
    pub fn paths(&self) -> Vec<&FieldPath> {
        let mut out = Vec::new();
        self.collect_paths(&mut out);
        out
    }

    fn collect_paths<'a>(&'a self, out: &mut Vec<&'a FieldPath>) {
        match self {
            FilterNode::Logical { children, .. } => {
                for child in children {
                    child.collect_paths(out);
                }
            }
            FilterNode::Comparison { path, .. } => out.push(path),
        }
    }
}

fn and_of(mut nodes: Vec<FilterNode>) -> FilterNode {
    if nodes.len() == 1 {
        nodes.remove(0)
    } else {
        FilterNode::Logical {
            op: LogicalOp::And,
            children: nodes,
        }
    }
}

fn parse_clause(clause: &Map<String, Value>) -> CompileResult<Vec<FilterNode>> {
    let mut nodes = Vec::with_capacity(clause.len());
    for (key, value) in clause {
        if key.starts_with('$') {
            nodes.push(parse_logical(key, value)?);
        } else {
            nodes.extend(parse_field(key, value)?);
        }
    }
    Ok(nodes)
}

fn parse_logical(key: &str, value: &Value) -> CompileResult<FilterNode> {
    let op = LogicalOp::from_token(key)
        .ok_or_else(|| CompileError::syntax(format!("Unknown logical operator '{}'", key)))?;

    let children = match op {
        LogicalOp::And | LogicalOp::Or => {
            let items = value.as_array().ok_or_else(|| {
                CompileError::syntax(format!("{} expects a list of filter clauses", key))
            })?;
            items
                .iter()
                .map(FilterNode::parse)
                .collect::<CompileResult<Vec<_>>>()?
        }
        LogicalOp::Not => {
            if !value.is_object() {
                return Err(CompileError::syntax(format!(
                    "{} expects a single filter clause object",
                    key
                )));
            }
            vec![FilterNode::parse(value)?]
        }
    };

    Ok(FilterNode::Logical { op, children })
}

fn parse_field(key: &str, value: &Value) -> CompileResult<Vec<FilterNode>> {
    let path = FieldPath::parse(key)?;
    let operators = value
        .as_object()
        .filter(|ops| !ops.is_empty())
        .ok_or_else(|| {
            CompileError::operand(
                key,
                "",
                "expected an object mapping operators to values, e.g. {\"$eq\": ...}",
            )
        })?;

    operators
        .iter()
        .map(|(token, operand)| {
            let op = ComparisonOp::from_token(token).ok_or_else(|| {
                CompileError::syntax_at(
                    key,
                    format!("Unknown operator '{}' for field '{}'", token, key),
                )
            })?;
            Ok(FilterNode::Comparison {
                path: path.clone(),
                op,
                operand: Operand::from_json(op, operand, key)?,
            })
        })
        .collect()
}
