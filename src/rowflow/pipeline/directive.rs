//! Parsed directive types for the pipeline mini-languages.
//!
//! Each stage expression (transform, aggregate, sort) parses into an
//! explicit list of these directives before any row is touched, keeping
//! parsing and execution independently testable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A column-rewriting function usable in a transform directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformFn {
    /// Rewrite an 8-digit value to `YYYY-MM-DD`
    DateFormat,
    /// Percent-decode the value
    UrlDecode,
    /// Keep only the URL path component
    PathOnly,
    /// Drop the query string, or keep only listed keys
    StripQs,
}

impl TransformFn {
    /// Parse a function keyword as written in a transform expression
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "date_format" => Some(TransformFn::DateFormat),
            "url_decode" => Some(TransformFn::UrlDecode),
            "path_only" => Some(TransformFn::PathOnly),
            "strip_qs" => Some(TransformFn::StripQs),
            _ => None,
        }
    }
}

impl fmt::Display for TransformFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransformFn::DateFormat => "date_format",
            TransformFn::UrlDecode => "url_decode",
            TransformFn::PathOnly => "path_only",
            TransformFn::StripQs => "strip_qs",
        };
        write!(f, "{}", name)
    }
}

/// One parsed transform instruction: rewrite `column` with `function`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformDirective {
    pub column: String,
    pub function: TransformFn,
    /// Free-form argument string, e.g. the keep-list for `strip_qs`
    pub args: Option<String>,
}

/// An aggregate function usable in a group/aggregate directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateFn {
    Sum,
    Mean,
    Count,
    Min,
    Max,
    Median,
}

impl AggregateFn {
    /// Parse a function keyword as written in an aggregate expression
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "sum" => Some(AggregateFn::Sum),
            "mean" => Some(AggregateFn::Mean),
            "count" => Some(AggregateFn::Count),
            "min" => Some(AggregateFn::Min),
            "max" => Some(AggregateFn::Max),
            "median" => Some(AggregateFn::Median),
            _ => None,
        }
    }
}

impl fmt::Display for AggregateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggregateFn::Sum => "sum",
            AggregateFn::Mean => "mean",
            AggregateFn::Count => "count",
            AggregateFn::Min => "min",
            AggregateFn::Max => "max",
            AggregateFn::Median => "median",
        };
        write!(f, "{}", name)
    }
}

/// One parsed aggregate instruction: `function` over `column`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateDirective {
    pub function: AggregateFn,
    pub column: String,
}

impl AggregateDirective {
    /// Name of the output column this directive produces
    pub fn output_column(&self) -> String {
        format!("{}_{}", self.function, self.column)
    }
}

/// Sort direction for one sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse a direction keyword; matching is case-insensitive
    pub fn parse(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "ASC" => Some(SortDirection::Asc),
            "DESC" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// One parsed sort key: order by `column` in `direction`.
///
/// Directive order defines primary/secondary/... sort priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortDirective {
    pub column: String,
    pub direction: SortDirection,
}
