//! Split-based parsers for the stage expression mini-languages.
//!
//! Each parser turns one expression string into an explicit directive list;
//! nothing here touches rows. Column existence is checked by the stage
//! processors, which know the dataset; function keywords are checked here,
//! where the offending segment is still in hand.

use super::directive::{
    AggregateDirective, AggregateFn, SortDirection, SortDirective, TransformDirective,
    TransformFn,
};
use super::error::{PipelineError, PipelineResult};

/// Parse a transform expression: `column:function[:args](,segment)*`.
///
/// A segment with no colon is not a new directive — it continues the
/// previous directive's args, joined with a comma. That is how an argument
/// list such as `id,ref` for `strip_qs` survives being split on commas:
///
/// ```text
/// url:strip_qs:id,ref   =>   [ url  strip_qs  args="id,ref" ]
/// ```
pub fn parse_transform_expr(expr: &str) -> PipelineResult<Vec<TransformDirective>> {
    let mut directives: Vec<TransformDirective> = Vec::new();

    for raw in expr.split(',') {
        let segment = raw.trim();
        if segment.is_empty() {
            return Err(PipelineError::parse_error(
                "empty transform segment",
                Some(raw.to_string()),
            ));
        }

        if let Some((column, rest)) = segment.split_once(':') {
            let (function_name, args) = match rest.split_once(':') {
                Some((name, args)) => (name.trim(), Some(args.to_string())),
                None => (rest.trim(), None),
            };

            let column = column.trim();
            if column.is_empty() {
                return Err(PipelineError::parse_error(
                    "missing column name",
                    Some(segment.to_string()),
                ));
            }

            let function = TransformFn::parse(function_name).ok_or_else(|| {
                PipelineError::parse_error(
                    format!("unknown transform function '{}'", function_name),
                    Some(segment.to_string()),
                )
            })?;

            directives.push(TransformDirective {
                column: column.to_string(),
                function,
                args,
            });
        } else {
            // Continuation: append to the previous directive's args.
            match directives.last_mut() {
                Some(prev) => {
                    prev.args = Some(match prev.args.take() {
                        Some(existing) => format!("{},{}", existing, segment),
                        None => segment.to_string(),
                    });
                }
                None => {
                    return Err(PipelineError::parse_error(
                        "argument segment with no preceding directive",
                        Some(segment.to_string()),
                    ));
                }
            }
        }
    }

    if directives.is_empty() {
        return Err(PipelineError::parse_error(
            "transform expression contains no directives",
            None,
        ));
    }

    Ok(directives)
}

/// Parse an aggregate expression: `function:column(,function:column)*`
pub fn parse_aggregate_expr(expr: &str) -> PipelineResult<Vec<AggregateDirective>> {
    let mut directives = Vec::new();

    for raw in expr.split(',') {
        let segment = raw.trim();
        if segment.is_empty() {
            return Err(PipelineError::parse_error(
                "empty aggregate segment",
                Some(raw.to_string()),
            ));
        }

        let (function_name, column) = segment.split_once(':').ok_or_else(|| {
            PipelineError::parse_error(
                "aggregate segment must be 'function:column'",
                Some(segment.to_string()),
            )
        })?;

        let function_name = function_name.trim();
        let column = column.trim();

        let function = AggregateFn::parse(function_name).ok_or_else(|| {
            PipelineError::parse_error(
                format!("unknown aggregate function '{}'", function_name),
                Some(segment.to_string()),
            )
        })?;

        if column.is_empty() {
            return Err(PipelineError::parse_error(
                "missing aggregate source column",
                Some(segment.to_string()),
            ));
        }

        directives.push(AggregateDirective {
            function,
            column: column.to_string(),
        });
    }

    if directives.is_empty() {
        return Err(PipelineError::parse_error(
            "aggregate expression contains no directives",
            None,
        ));
    }

    Ok(directives)
}

/// Parse a sort expression: `column [ASC|DESC](, column [ASC|DESC])*`.
///
/// Direction is optional (default ASC) and case-insensitive, but a word in
/// direction position that is not ASC/DESC is an error.
pub fn parse_sort_expr(expr: &str) -> PipelineResult<Vec<SortDirective>> {
    let mut directives = Vec::new();

    for raw in expr.split(',') {
        let segment = raw.trim();
        if segment.is_empty() {
            return Err(PipelineError::parse_error(
                "empty sort segment",
                Some(raw.to_string()),
            ));
        }

        let mut words = segment.split_whitespace();
        let column = words.next().unwrap_or_default();
        let direction = match words.next() {
            Some(word) => SortDirection::parse(word).ok_or_else(|| {
                PipelineError::parse_error(
                    format!("sort direction must be ASC or DESC, got '{}'", word),
                    Some(segment.to_string()),
                )
            })?,
            None => SortDirection::default(),
        };

        if words.next().is_some() {
            return Err(PipelineError::parse_error(
                "sort segment has trailing tokens",
                Some(segment.to_string()),
            ));
        }

        directives.push(SortDirective {
            column: column.to_string(),
            direction,
        });
    }

    if directives.is_empty() {
        return Err(PipelineError::parse_error(
            "sort expression contains no keys",
            None,
        ));
    }

    Ok(directives)
}

/// Parse a comma-separated column list (group_by keys, projection)
pub fn parse_column_list(expr: &str) -> PipelineResult<Vec<String>> {
    let mut columns = Vec::new();

    for raw in expr.split(',') {
        let name = raw.trim();
        if name.is_empty() {
            return Err(PipelineError::parse_error(
                "empty column name in list",
                Some(raw.to_string()),
            ));
        }
        columns.push(name.to_string());
    }

    if columns.is_empty() {
        return Err(PipelineError::parse_error("empty column list", None));
    }

    Ok(columns)
}
