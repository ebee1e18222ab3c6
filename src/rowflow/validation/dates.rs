//! Date-range field validation.
//!
//! Date fields accept either an absolute ISO calendar date (`2026-01-15`)
//! or one of a fixed set of relative expressions, resolved against an
//! injected "today" so validation stays pure and testable:
//!
//! | expression           | meaning                          |
//! |----------------------|----------------------------------|
//! | `today`, `yesterday` | the obvious                      |
//! | `today-Nd`/`today+Nd`| N days back/forward              |
//! | `week_start`/`week_end`   | ISO week (Mon..Sun) of today |
//! | `month_start`/`month_end` | current calendar month       |
//! | `year_start`/`year_end`   | current calendar year        |
//! | `prev_month_start`/`prev_month_end` | previous month     |
//!
//! On success the resolved absolute date is substituted into the
//! normalized output, so downstream consumers never see a relative
//! expression.

use chrono::{Datelike, Duration, NaiveDate};
use serde_json::Value;

use super::result_types::{json_type_name, ErrorCode, ValidationError};

/// A resolved, inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Resolve a date expression against `today`; `None` when the expression
/// is not part of the grammar.
pub fn resolve_date_expr(expr: &str, today: NaiveDate) -> Option<NaiveDate> {
    match expr {
        "today" => return Some(today),
        "yesterday" => return today.pred_opt(),
        "week_start" => {
            let back = today.weekday().num_days_from_monday() as i64;
            return Some(today - Duration::days(back));
        }
        "week_end" => {
            let back = today.weekday().num_days_from_monday() as i64;
            return Some(today - Duration::days(back) + Duration::days(6));
        }
        "month_start" => return today.with_day(1),
        "month_end" => return month_end(today),
        "year_start" => return today.with_ordinal(1),
        "year_end" => return NaiveDate::from_ymd_opt(today.year(), 12, 31),
        "prev_month_start" => {
            let prev = today.with_day(1)?.pred_opt()?;
            return prev.with_day(1);
        }
        "prev_month_end" => return today.with_day(1)?.pred_opt(),
        _ => {}
    }

    // today-Nd / today+Nd
    if let Some(rest) = expr.strip_prefix("today") {
        let (sign, body) = match rest.bytes().next() {
            Some(b'-') => (-1i64, &rest[1..]),
            Some(b'+') => (1i64, &rest[1..]),
            _ => return None,
        };
        let digits = body.strip_suffix('d')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let n: i64 = digits.parse().ok()?;
        return today.checked_add_signed(Duration::days(sign * n));
    }

    // absolute ISO date
    NaiveDate::parse_from_str(expr, "%Y-%m-%d").ok()
}

fn month_end(today: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()
}

/// Validate one date field, returning the resolved absolute date
pub fn validate_date(
    path: &str,
    value: &Value,
    today: NaiveDate,
) -> Result<NaiveDate, ValidationError> {
    let expr = value.as_str().ok_or_else(|| {
        ValidationError::new(
            ErrorCode::InvalidType,
            path,
            format!("date must be a string, got {}", json_type_name(value)),
        )
    })?;

    resolve_date_expr(expr, today).ok_or_else(|| {
        ValidationError::new(
            ErrorCode::InvalidDate,
            path,
            format!("'{}' is neither an ISO date nor a known relative expression", expr),
        )
        .with_hint("use YYYY-MM-DD, today, today-7d, month_start, ...")
    })
}

/// Validate a start/end pair, accumulating errors from both fields
pub fn validate_date_range(
    start: &Value,
    end: &Value,
    today: NaiveDate,
) -> Result<DateRange, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let start = match validate_date("$.start_date", start, today) {
        Ok(date) => Some(date),
        Err(e) => {
            errors.push(e);
            None
        }
    };
    let end = match validate_date("$.end_date", end, today) {
        Ok(date) => Some(date),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    match (start, end) {
        (Some(start), Some(end)) => Ok(DateRange { start, end }),
        _ => Err(errors),
    }
}
