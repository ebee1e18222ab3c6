//! # rowflow
//!
//! A declarative pipeline engine for reshaping tabular query results
//! before they are shown, saved, or handed to another system.
//!
//! ## Features
//!
//! - **Pipeline engine**: column transforms, row filters, group/aggregate,
//!   sort, projection and row-limit over an in-memory [`Dataset`] — pure,
//!   synchronous, and side-effect-free
//! - **Specification validation**: the pipeline and save grammars checked
//!   up front with accumulate-all-errors structured diagnostics
//! - **Job record store**: atomic, file-backed lifecycle tracking for
//!   asynchronously executed queries
//!
//! ## Quick Start
//!
//! ```rust
//! use rowflow::{Dataset, PipelineEngine, SpecValidator};
//! use serde_json::json;
//!
//! let validator = SpecValidator::new();
//! let spec = validator
//!     .validate_pipeline(&json!({
//!         "group_by": "page",
//!         "aggregate": "sum:clicks",
//!         "sort": "sum_clicks DESC",
//!         "head": 1
//!     }))
//!     .expect("spec is well-formed");
//!
//! let data = Dataset::from_json_rows(&json!([
//!     {"page": "/a", "clicks": 10},
//!     {"page": "/a", "clicks": 5},
//!     {"page": "/b", "clicks": 20}
//! ]))
//! .unwrap();
//!
//! let result = PipelineEngine::execute(&data, &spec).unwrap();
//! assert_eq!(result.len(), 1);
//! ```

pub mod rowflow;

// Re-export the primary types at the crate root
pub use crate::rowflow::job::{JobRecord, JobStatus, JobStore, JobStoreError, JobUpdate};
pub use crate::rowflow::pipeline::{
    Dataset, FieldValue, PipelineEngine, PipelineError, PipelineSpec, Row,
};
pub use crate::rowflow::validation::{
    ErrorCode, SaveMode, SaveSpec, SaveTarget, SpecValidator, ValidationError,
};
