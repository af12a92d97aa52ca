//! Compilation errors.
//!
//! Every rejection names the offending field path where one exists, so the
//! service layer can turn it into a client error without parsing messages.

use serde::Serialize;

use crate::catalog::CatalogError;

/// Result alias used throughout the compiler.
pub type CompileResult<T> = Result<T, CompileError>;

/// Why a query specification was rejected.
///
/// A single invalid clause aborts the whole compilation; nothing is
/// partially applied to the query.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    /// Malformed input: bad JSON, unknown operator, bad sort direction,
    /// empty path segment.
    #[error("{message}")]
    Syntax {
        field: Option<String>,
        message: String,
    },

    /// A path segment does not exist on the entity it was looked up on, or
    /// names the wrong kind of attribute.
    #[error("Cannot resolve '{path}': {reason} '{segment}' on entity '{entity}'")]
    Resolution {
        path: String,
        segment: String,
        entity: String,
        reason: ResolutionReason,
    },

    /// Field or operator not allowed for this query type.
    #[error("{}", policy_message(.capability, .field, .operator.as_deref()))]
    Policy {
        capability: Capability,
        field: String,
        operator: Option<String>,
    },

    /// A search path visits the same entity twice.
    #[error("Circular reference in search path '{path}': entity '{entity}' is visited twice")]
    Cycle { path: String, entity: String },

    /// Operand has the wrong shape for its operator or column.
    #[error("Invalid value for '{field}'{}: {message}", operator_clause(.operator))]
    OperandType {
        field: String,
        operator: String,
        message: String,
    },

    /// The query type itself could not be described.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// The capability a field was used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Filter,
    Sort,
    Search,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Capability::Filter => "filter",
            Capability::Sort => "sort",
            Capability::Search => "search",
        })
    }
}

/// Why a path segment failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionReason {
    /// No column or relationship with that name.
    Unknown,
    /// A column where a relationship was needed (mid-path).
    NotARelationship,
    /// A relationship where a column was needed (end of path).
    NotAColumn,
    /// A relationship whose target entity is not in the schema.
    MissingTarget,
}

impl std::fmt::Display for ResolutionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ResolutionReason::Unknown => "unknown field",
            ResolutionReason::NotARelationship => "expected a relationship but found column",
            ResolutionReason::NotAColumn => "expected a column but found relationship",
            ResolutionReason::MissingTarget => "relationship target is not defined for",
        })
    }
}

fn policy_message(capability: &Capability, field: &str, operator: Option<&str>) -> String {
    match (capability, operator) {
        (Capability::Filter, Some(op)) => {
            format!("Operator {} is not allowed for field '{}'", op, field)
        }
        (Capability::Filter, None) => format!("Field '{}' is not filterable", field),
        (Capability::Sort, _) => format!("Field '{}' is not sortable", field),
        (Capability::Search, _) => format!("Field '{}' is not searchable", field),
    }
}

fn operator_clause(operator: &str) -> String {
    if operator.is_empty() {
        String::new()
    } else {
        format!(" with operator {}", operator)
    }
}

/// Stable classification of a [`CompileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Syntax,
    Resolution,
    Policy,
    Cycle,
    OperandType,
    Configuration,
}

impl CompileError {
    pub(crate) fn syntax(message: impl Into<String>) -> Self {
        CompileError::Syntax {
            field: None,
            message: message.into(),
        }
    }

    pub(crate) fn syntax_at(field: impl Into<String>, message: impl Into<String>) -> Self {
        CompileError::Syntax {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub(crate) fn operand(
        field: impl Into<String>,
        operator: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        CompileError::OperandType {
            field: field.into(),
            operator: operator.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::Syntax { .. } => ErrorKind::Syntax,
            CompileError::Resolution { .. } => ErrorKind::Resolution,
            CompileError::Policy { .. } => ErrorKind::Policy,
            CompileError::Cycle { .. } => ErrorKind::Cycle,
            CompileError::OperandType { .. } => ErrorKind::OperandType,
            CompileError::Catalog(_) => ErrorKind::Configuration,
        }
    }

    /// The field path the error is about, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            CompileError::Syntax { field, .. } => field.as_deref(),
            CompileError::Resolution { path, .. } | CompileError::Cycle { path, .. } => Some(path),
            CompileError::Policy { field, .. } | CompileError::OperandType { field, .. } => {
                Some(field)
            }
            CompileError::Catalog(_) => None,
        }
    }

    /// Structured form for API responses.
    pub fn rejection(&self) -> Rejection {
        Rejection {
            kind: self.kind(),
            field: self.field().map(str::to_string),
            message: self.to_string(),
        }
    }
}

/// Serializable description of a rejected specification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}
