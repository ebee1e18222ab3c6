//! Result-set pipeline engine.
//!
//! Parses and executes the declarative pipeline notation over an in-memory
//! [`Dataset`]: column transforms, row filters, group/aggregate, sort,
//! projection, and row limit, in that fixed order.
//!
//! The engine is a pure, synchronous computation — no I/O, no shared
//! state. Validation of raw specification objects happens upstream in
//! [`crate::rowflow::validation`]; by the time a [`PipelineSpec`] reaches
//! [`PipelineEngine::execute`] its grammar is already known to be sound,
//! and only data-dependent failures (unknown columns, type mismatches)
//! remain.

pub mod directive;
pub mod engine;
pub mod error;
pub mod expression;
pub mod parser;
pub mod processors;
pub mod types;

pub use directive::{
    AggregateDirective, AggregateFn, SortDirection, SortDirective, TransformDirective,
    TransformFn,
};
pub use engine::{PipelineEngine, PipelineSpec};
pub use error::{PipelineError, PipelineResult};
pub use types::{Dataset, FieldValue, Row};
