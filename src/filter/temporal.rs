//! Date handling for datetime columns.
//!
//! A date-only operand (`2024-01-15`, no `T` and no space) means the whole
//! calendar day, so comparisons are widened to the half-open interval
//! `[day 00:00, next day 00:00)`. Operands with a time component are exact
//! instants; offsets are normalized to UTC.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use super::operator::ComparisonOp;
use crate::error::{CompileError, CompileResult};
use crate::sql::{lit_timestamp, Expr, ExprExt};

/// A parsed datetime operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalValue {
    /// A whole calendar day.
    Day(Date),
    /// An exact point in time (UTC when an offset was given).
    Instant(PrimitiveDateTime),
}

impl TemporalValue {
    /// Parse an ISO-8601 date or datetime. Returns `None` when unparseable.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if !raw.contains('T') && !raw.contains(' ') {
            return Date::parse(raw, format_description!("[year]-[month]-[day]"))
                .ok()
                .map(TemporalValue::Day);
        }

        let normalized = raw.replacen(' ', "T", 1);
        if let Ok(dt) = OffsetDateTime::parse(&normalized, &Rfc3339) {
            let utc = dt.to_offset(UtcOffset::UTC);
            return Some(TemporalValue::Instant(PrimitiveDateTime::new(
                utc.date(),
                utc.time(),
            )));
        }

        let naive = normalized.strip_suffix('Z').unwrap_or(&normalized);
        PrimitiveDateTime::parse(
            naive,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        )
        .or_else(|_| {
            PrimitiveDateTime::parse(
                naive,
                format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
            )
        })
        .or_else(|_| {
            PrimitiveDateTime::parse(naive, format_description!("[year]-[month]-[day]T[hour]:[minute]"))
        })
        .ok()
        .map(TemporalValue::Instant)
    }
}

/// Render a timestamp as the literal text the dialects expect.
fn timestamp_text(value: PrimitiveDateTime) -> Result<String, time::error::Format> {
    if value.nanosecond() == 0 {
        value.format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
    } else {
        value.format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]"
        ))
    }
}

fn timestamp_literal(value: PrimitiveDateTime, field: &str, op: ComparisonOp) -> CompileResult<Expr> {
    timestamp_text(value)
        .map(lit_timestamp)
        .map_err(|e| CompileError::operand(field, op.token(), e.to_string()))
}

fn day_bounds(day: Date, field: &str, op: ComparisonOp) -> CompileResult<(Expr, Expr)> {
    let next = day.next_day().ok_or_else(|| {
        CompileError::operand(field, op.token(), format!("date {} is out of range", day))
    })?;
    Ok((
        timestamp_literal(day.midnight(), field, op)?,
        timestamp_literal(next.midnight(), field, op)?,
    ))
}

/// Parse a datetime operand or fail with a syntax error naming the field.
pub(crate) fn parse_operand(raw: &str, field: &str) -> CompileResult<TemporalValue> {
    TemporalValue::parse(raw).ok_or_else(|| {
        CompileError::syntax_at(
            field,
            format!(
                "Invalid date '{}' for field '{}': expected YYYY-MM-DD or an ISO-8601 datetime",
                raw, field
            ),
        )
    })
}

/// Compile an equality or ordering comparison against a datetime column.
pub(crate) fn compare(
    column: Expr,
    op: ComparisonOp,
    value: TemporalValue,
    field: &str,
) -> CompileResult<Expr> {
    match value {
        TemporalValue::Day(day) => {
            let (start, end) = day_bounds(day, field, op)?;
            Ok(match op {
                ComparisonOp::Eq => column.clone().gte(start).and(column.lt(end)),
                ComparisonOp::Ne => column.clone().lt(start).or(column.gte(end)),
                ComparisonOp::Gt => column.gte(end),
                ComparisonOp::Gte => column.gte(start),
                ComparisonOp::Lt => column.lt(start),
                ComparisonOp::Lte => column.lt(end),
                other => return Err(unsupported(other, field)),
            })
        }
        TemporalValue::Instant(instant) => {
            let lit = timestamp_literal(instant, field, op)?;
            Ok(match op {
                ComparisonOp::Eq => column.eq(lit),
                ComparisonOp::Ne => column.ne(lit),
                ComparisonOp::Gt => column.gt(lit),
                ComparisonOp::Gte => column.gte(lit),
                ComparisonOp::Lt => column.lt(lit),
                ComparisonOp::Lte => column.lte(lit),
                other => return Err(unsupported(other, field)),
            })
        }
    }
}

fn unsupported(op: ComparisonOp, field: &str) -> CompileError {
    CompileError::operand(field, op.token(), "operator does not compare dates")
}
