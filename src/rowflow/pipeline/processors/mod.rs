//! Stage processors for the result-set pipeline.
//!
//! One processor per stage, each a pure function from dataset to dataset:
//!
//! - [`TransformProcessor`] - column value rewriting
//! - [`FilterProcessor`] - row predicate filtering
//! - [`GroupProcessor`] - group/aggregate collapsing
//! - [`OrderProcessor`] - stable multi-key sorting
//! - [`ProjectProcessor`] - column selection and reordering
//! - [`LimitProcessor`] - head truncation
//!
//! The orchestration order lives in [`super::engine`]; processors know
//! nothing about each other.

pub mod filter;
pub mod group;
pub mod limit;
pub mod order;
pub mod project;
pub mod transform;

pub use filter::FilterProcessor;
pub use group::GroupProcessor;
pub use limit::LimitProcessor;
pub use order::OrderProcessor;
pub use project::ProjectProcessor;
pub use transform::TransformProcessor;
