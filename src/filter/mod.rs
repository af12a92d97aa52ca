//! Filter compilation.
//!
//! A filter is a JSON tree of logical combinators (`$and`, `$or`, `$not`)
//! over field comparisons:
//!
//! ```json
//! {"$or": [{"age": {"$gte": 18}}, {"role.name": {"$eq": "admin"}}]}
//! ```
//!
//! Parsing ([`FilterNode::parse`]) checks structure only. Compilation locates
//! each field in the schema, checks it against the query type's catalog,
//! resolves it through the shared join registry and applies the operator.

mod node;
pub mod operator;
pub mod temporal;

pub use node::FilterNode;
pub use operator::{
    compile_comparison, escape_like, ComparisonOp, LogicalOp, Operand, OperandShape, Scalar,
    LIKE_ESCAPE,
};
pub use temporal::TemporalValue;

use crate::catalog::QueryCatalog;
use crate::error::{Capability, CompileError, CompileResult};
use crate::resolve::{CompileContext, JoinStrategy};
use crate::sql::{Expr, ExprExt};

/// Compile a filter tree into one boolean expression.
///
/// Returns `None` when the tree contributes nothing (e.g. `{}` or an empty
/// `$and`).
pub fn compile_filter(
    ctx: &mut CompileContext<'_>,
    catalog: &QueryCatalog,
    node: &FilterNode,
) -> CompileResult<Option<Expr>> {
    match node {
        FilterNode::Logical { op, children } => {
            let mut parts = Vec::with_capacity(children.len());
            for child in children {
                if let Some(expr) = compile_filter(ctx, catalog, child)? {
                    parts.push(expr);
                }
            }
            Ok(match op {
                LogicalOp::And => Expr::conjunction(parts),
                LogicalOp::Or => Expr::disjunction(parts),
                LogicalOp::Not => Expr::conjunction(parts).map(ExprExt::not),
            })
        }
        FilterNode::Comparison { path, op, operand } => {
            let field = path.to_string();
            ctx.locate(path)?;
            catalog.check(Capability::Filter, path)?;

            let column = ctx.resolve(path, JoinStrategy::Unkeyed)?;
            let category = column.column_type.category().ok_or_else(|| CompileError::Policy {
                capability: Capability::Filter,
                field: field.clone(),
                operator: None,
            })?;
            if !ComparisonOp::allowed_for(category).contains(op) {
                return Err(CompileError::Policy {
                    capability: Capability::Filter,
                    field,
                    operator: Some(op.token().to_string()),
                });
            }

            compile_comparison(&column, category, *op, operand, &field).map(Some)
        }
    }
}
