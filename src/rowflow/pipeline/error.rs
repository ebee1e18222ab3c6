/*!
# Pipeline Error Handling

Error types for parsing and executing result-set pipelines. All pipeline
operations return well-structured errors carrying enough context (stage,
column, expression segment) to reproduce and fix the problem.

Two properties are load-bearing here:

- Execution fails fast: the first error aborts the whole pipeline and no
  partial dataset is ever returned.
- Every error names the thing that caused it — the offending directive
  segment, column, or stage — so a caller can surface a single actionable
  message.

Errors implement the standard traits (`std::error::Error`, `Display`,
`Debug`) for integration with the usual error-handling machinery.
*/

use std::fmt;

/// Error type for pipeline parsing and execution.
///
/// Each variant carries the context relevant to its failure mode. Stage
/// processors produce the specific variants; the engine wraps whatever a
/// stage returns into [`PipelineError::StageError`] so callers always learn
/// which stage aborted the run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// A directive expression could not be parsed.
    ///
    /// Produced while splitting a transform/sort/aggregate expression into
    /// directives, before any row is touched.
    ParseError {
        /// Human-readable error message
        message: String,
        /// The expression segment that failed to parse, if identifiable
        segment: Option<String>,
    },

    /// A directive referenced a column that does not exist, or produced a
    /// column collision.
    SchemaError {
        /// Description of the schema violation
        message: String,
        /// Name of the column involved, if applicable
        column: Option<String>,
    },

    /// A value had the wrong type for the operation applied to it.
    TypeError {
        /// Expected type or type family
        expected: String,
        /// Actual type encountered
        actual: String,
        /// The offending value, if available
        value: Option<String>,
    },

    /// A row filter expression failed to parse or evaluate.
    ///
    /// Always includes the underlying cause so malformed expressions and
    /// unknown columns are distinguishable.
    FilterError {
        /// The filter expression as given
        expression: String,
        /// Description of the failure
        message: String,
    },

    /// A stage aborted the pipeline.
    ///
    /// Wraps the stage's own error text with the stage name; this is the
    /// variant the orchestrator returns to callers.
    StageError {
        /// Stage name: transform, filter, group, sort, project, or limit
        stage: String,
        /// The stage's error, rendered
        message: String,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::ParseError { message, segment } => {
                if let Some(seg) = segment {
                    write!(f, "expression parse error in segment '{}': {}", seg, message)
                } else {
                    write!(f, "expression parse error: {}", message)
                }
            }
            PipelineError::SchemaError { message, column } => {
                if let Some(col) = column {
                    write!(f, "schema error for column '{}': {}", col, message)
                } else {
                    write!(f, "schema error: {}", message)
                }
            }
            PipelineError::TypeError {
                expected,
                actual,
                value,
            } => {
                if let Some(val) = value {
                    write!(
                        f,
                        "type error: expected {}, got {} for value '{}'",
                        expected, actual, val
                    )
                } else {
                    write!(f, "type error: expected {}, got {}", expected, actual)
                }
            }
            PipelineError::FilterError {
                expression,
                message,
            } => {
                write!(f, "invalid filter expression '{}': {}", expression, message)
            }
            PipelineError::StageError { stage, message } => {
                write!(f, "pipeline stage '{}' failed: {}", stage, message)
            }
        }
    }
}

impl std::error::Error for PipelineError {}

impl PipelineError {
    /// Create a parse error, optionally naming the offending segment
    pub fn parse_error(message: impl Into<String>, segment: Option<String>) -> Self {
        PipelineError::ParseError {
            message: message.into(),
            segment,
        }
    }

    /// Create a schema error
    pub fn schema_error(message: impl Into<String>, column: Option<String>) -> Self {
        PipelineError::SchemaError {
            message: message.into(),
            column,
        }
    }

    /// Create a type error
    pub fn type_error(
        expected: impl Into<String>,
        actual: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        PipelineError::TypeError {
            expected: expected.into(),
            actual: actual.into(),
            value,
        }
    }

    /// Create a filter error carrying the expression and underlying cause
    pub fn filter_error(expression: impl Into<String>, message: impl Into<String>) -> Self {
        PipelineError::FilterError {
            expression: expression.into(),
            message: message.into(),
        }
    }

    /// Wrap a stage failure with the stage name
    pub fn stage_error(stage: impl Into<String>, inner: &PipelineError) -> Self {
        PipelineError::StageError {
            stage: stage.into(),
            message: inner.to_string(),
        }
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
