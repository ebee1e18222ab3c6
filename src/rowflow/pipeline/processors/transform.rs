//! Column transform processor.
//!
//! Applies parsed [`TransformDirective`]s to every row, left to right
//! across the expression. Values that a function does not apply to pass
//! through unchanged; the rewrite rules themselves are exact:
//!
//! - `date_format`: an 8-digit value becomes `YYYY-MM-DD`, anything else
//!   is left alone.
//! - `url_decode`: percent-decoding, lossy UTF-8.
//! - `path_only`: the URL path component; a value that has no path keeps
//!   its original form.
//! - `strip_qs`: with no args, both query string and fragment are cut.
//!   With a keep-list, the query is rewritten to the surviving pairs with
//!   their raw bytes intact and the fragment is left untouched. The
//!   fragment asymmetry is a documented quirk of the notation and is
//!   preserved deliberately.

use percent_encoding::percent_decode_str;
use url::Url;

use super::super::directive::{TransformDirective, TransformFn};
use super::super::error::{PipelineError, PipelineResult};
use super::super::types::{Dataset, FieldValue};

/// Processor for the transform stage
pub struct TransformProcessor;

impl TransformProcessor {
    /// Apply directives to every row, returning a new dataset.
    ///
    /// A directive naming a column absent from the dataset is a hard
    /// error; nothing is applied in that case.
    pub fn process(
        dataset: &Dataset,
        directives: &[TransformDirective],
    ) -> PipelineResult<Dataset> {
        for directive in directives {
            if !dataset.has_column(&directive.column) {
                return Err(PipelineError::schema_error(
                    format!(
                        "unknown column in transform directive '{}:{}'",
                        directive.column, directive.function
                    ),
                    Some(directive.column.clone()),
                ));
            }
        }

        let mut rows = dataset.rows.clone();
        for directive in directives {
            for row in &mut rows {
                if let Some(value) = row.get(&directive.column) {
                    let rewritten = apply(directive, value);
                    row.insert(directive.column.clone(), rewritten);
                }
            }
        }

        Ok(Dataset::new(dataset.columns.clone(), rows))
    }
}

fn apply(directive: &TransformDirective, value: &FieldValue) -> FieldValue {
    match directive.function {
        TransformFn::DateFormat => date_format(value),
        TransformFn::UrlDecode => match value {
            FieldValue::String(s) => FieldValue::String(url_decode(s)),
            other => other.clone(),
        },
        TransformFn::PathOnly => match value {
            FieldValue::String(s) => FieldValue::String(path_only(s)),
            other => other.clone(),
        },
        TransformFn::StripQs => match value {
            FieldValue::String(s) => {
                FieldValue::String(strip_qs(s, directive.args.as_deref()))
            }
            other => other.clone(),
        },
    }
}

/// `20260115` → `2026-01-15`; values that are not exactly 8 digits are
/// returned unchanged. 8-digit integers are rewritten to a date string.
fn date_format(value: &FieldValue) -> FieldValue {
    let digits = match value {
        FieldValue::String(s) => s.clone(),
        FieldValue::Integer(i) => i.to_string(),
        other => return other.clone(),
    };

    if digits.len() == 8 && digits.bytes().all(|b| b.is_ascii_digit()) {
        FieldValue::String(format!(
            "{}-{}-{}",
            &digits[0..4],
            &digits[4..6],
            &digits[6..8]
        ))
    } else {
        value.clone()
    }
}

fn url_decode(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

/// Extract the URL path component. Relative values are treated as already
/// path-shaped and cut at the query/fragment; a value with no path at all
/// keeps its original form.
fn path_only(value: &str) -> String {
    match Url::parse(value) {
        Ok(url) => {
            let path = url.path();
            if path.is_empty() {
                value.to_string()
            } else {
                path.to_string()
            }
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let end = value.find(['?', '#']).unwrap_or(value.len());
            if end == 0 {
                value.to_string()
            } else {
                value[..end].to_string()
            }
        }
        Err(_) => value.to_string(),
    }
}

/// Query-string surgery, done on raw bytes so surviving pairs are never
/// re-encoded.
///
/// No keep-list: cut at the first `?` or `#` (query and fragment both go).
/// With a keep-list: retain only pairs whose key is listed, preserving
/// order, raw values (blank ones included) and flag-style keys; the
/// fragment stays where it was.
fn strip_qs(value: &str, args: Option<&str>) -> String {
    let keep: Vec<&str> = args
        .map(|a| a.split(',').map(str::trim).filter(|k| !k.is_empty()).collect())
        .unwrap_or_default();

    if keep.is_empty() {
        let end = value.find(['?', '#']).unwrap_or(value.len());
        return value[..end].to_string();
    }

    let Some(q) = value.find('?') else {
        return value.to_string();
    };

    let base = &value[..q];
    let rest = &value[q + 1..];
    let (query, fragment) = match rest.find('#') {
        Some(h) => (&rest[..h], &rest[h..]),
        None => (rest, ""),
    };

    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| {
            let key = pair.split('=').next().unwrap_or(pair);
            keep.contains(&key)
        })
        .collect();

    if kept.is_empty() {
        format!("{}{}", base, fragment)
    } else {
        format!("{}?{}{}", base, kept.join("&"), fragment)
    }
}
