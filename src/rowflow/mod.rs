pub mod job;
pub mod output;
pub mod pipeline;
pub mod validation;

// Re-export the main API surface
pub use job::{JobRecord, JobStatus, JobStore, JobStoreError, JobUpdate};
pub use pipeline::{Dataset, FieldValue, PipelineEngine, PipelineError, PipelineSpec, Row};
pub use validation::{SaveSpec, SpecValidator, ValidationError};
